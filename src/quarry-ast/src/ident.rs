//! Identifiers and their hygiene key.
//!
//! An [`Ident`] carries a name and an opaque shape tag ([`Quat`]). Hygiene
//! only ever looks at the name: two identifiers are the same binder iff
//! their [`IdentName`]s are equal.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Base name given to temporary identifiers when they are made permanent.
pub const PERMANENT_BASE: &str = "x";

/// Prefix of temporary identifier names. Not a legal user identifier.
const TEMPORARY_PREFIX: &str = "@tmp";

/// Opaque shape tag carried alongside identifiers.
///
/// Produced and consumed by type tracking outside this crate; the passes
/// here copy it around and never inspect it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quat {
    /// Shape not known yet.
    #[default]
    Unknown,
    /// A generic, not-yet-specialized shape.
    Generic,
    /// A scalar value.
    Value,
    /// A product with named fields.
    Product(Vec<(String, Quat)>),
}

/// Whether an identifier has a stable, human-meaningful name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentKind {
    /// A regular name.
    #[default]
    Fixed,
    /// A placeholder from an earlier rewrite phase, awaiting a canonical name.
    Temporary,
}

/// A variable reference or binder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ident {
    name: String,
    quat: Quat,
    kind: IdentKind,
}

impl Ident {
    /// Create a regular identifier with an unknown shape.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_quat(name, Quat::Unknown)
    }

    /// Create a regular identifier with the given shape tag.
    pub fn with_quat(name: impl Into<String>, quat: Quat) -> Self {
        Self {
            name: name.into(),
            quat,
            kind: IdentKind::Fixed,
        }
    }

    /// Create a temporary identifier from a unique token.
    pub fn temporary(token: u64, quat: Quat) -> Self {
        Self {
            name: format!("{TEMPORARY_PREFIX}{token}"),
            quat,
            kind: IdentKind::Temporary,
        }
    }

    /// The identifier's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shape tag.
    pub fn quat(&self) -> &Quat {
        &self.quat
    }

    /// Fixed or temporary.
    pub fn kind(&self) -> IdentKind {
        self.kind
    }

    /// Whether this is a temporary placeholder.
    pub fn is_temporary(&self) -> bool {
        self.kind == IdentKind::Temporary
    }

    /// The hygiene key of this identifier.
    pub fn ident_name(&self) -> IdentName {
        IdentName(self.name.clone())
    }

    /// Same identifier under a different name. Kind and shape are kept.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quat: self.quat.clone(),
            kind: self.kind,
        }
    }

    /// The canonical permanent replacement for this identifier.
    #[must_use]
    pub fn permanent(&self) -> Self {
        Self::with_quat(PERMANENT_BASE, self.quat.clone())
    }
}

// Shape tags and kinds do not take part in identity.
impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Ident {}

impl Hash for Ident {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The name of an identifier, used as the key for all hygiene decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentName(String);

impl IdentName {
    /// Wrap a raw name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IdentName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&Ident> for IdentName {
    fn from(ident: &Ident) -> Self {
        ident.ident_name()
    }
}

impl From<&str> for IdentName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for IdentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
