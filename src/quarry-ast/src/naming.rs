//! Naming state: the set of binder names already in use.
//!
//! The state is a persistent set. Extending it returns a new state and
//! leaves the original untouched, so it can be threaded by value through
//! recursive passes and shared freely across threads.

use im::HashSet;

use crate::ident::{Ident, IdentName};

/// Names already taken in the currently visible scope chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingState {
    used: HashSet<IdentName>,
}

impl NamingState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A state seeded with externally reserved names.
    pub fn seeded<I>(names: I) -> Self
    where
        I: IntoIterator<Item = IdentName>,
    {
        Self {
            used: names.into_iter().collect(),
        }
    }

    /// Whether `name` is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Number of taken names.
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether no name is taken.
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// This state plus `name`.
    #[must_use]
    pub fn with(&self, name: IdentName) -> Self {
        Self {
            used: self.used.update(name),
        }
    }

    /// This state plus every name in `names`.
    #[must_use]
    pub fn with_all<I>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = IdentName>,
    {
        let mut used = self.used.clone();
        used.extend(names);
        Self { used }
    }

    /// Iterate over the taken names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &IdentName> {
        self.used.iter()
    }

    /// Pick a name for `ident` that is not taken.
    ///
    /// Returns `ident` unchanged when its name is free. Otherwise appends
    /// the lowest suffix `1, 2, 3, ...` that yields a free name.
    pub fn fresh(&self, ident: &Ident) -> Ident {
        if !self.contains(ident.name()) {
            return ident.clone();
        }
        let mut suffix: usize = 1;
        loop {
            let candidate = format!("{}{suffix}", ident.name());
            if !self.contains(&candidate) {
                return ident.renamed(candidate);
            }
            suffix += 1;
        }
    }
}

impl FromIterator<IdentName> for NamingState {
    fn from_iter<T: IntoIterator<Item = IdentName>>(iter: T) -> Self {
        Self::seeded(iter)
    }
}
