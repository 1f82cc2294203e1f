//! List element identity.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identity of one element inside a collection.
///
/// Unsaved elements carry a client-generated value; the store may replace it
/// with its own canonical value on persist. The value is opaque either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a random client-side identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether no identity has been assigned yet.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Generates an identity distinct from every id in `existing`.
pub fn fresh_element_id<'a>(existing: impl IntoIterator<Item = &'a ElementId>) -> ElementId {
    let taken: HashSet<&ElementId> = existing.into_iter().collect();
    loop {
        let candidate = ElementId::generate();
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
}
