//! Property-based tests over random query trees.
//!
//! Trees are drawn from a small name pool so that shadowing and capture
//! situations come up often.
