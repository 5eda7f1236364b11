//! Error types and result aliases for Quarry.
//!
//! The hygiene and fusion passes themselves are total; these errors cover
//! the surfaces around them (rule drivers, validation, configuration).

mod error;

pub use error::{QuarryError, QuarryResult};
