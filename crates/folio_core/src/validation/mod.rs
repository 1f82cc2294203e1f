//! Draft validation engine.
//!
//! # Responsibility
//! - Hold the field-scoped error map produced by one validation pass.
//! - Provide the shared rule classes used by every entity rule set.
//!
//! # Invariants
//! - Validation is a pure function of the draft; it never mutates it.
//! - Every rule of a rule set runs on every pass, so the map is complete.
//! - The map is empty if and only if the draft may be saved.
//! - A map is rebuilt wholesale per pass, never patched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Field key → message map produced by one validation pass.
///
/// Keys are entity-level field names (`email`) or `field_index` for list
/// elements (`degree_0`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `key`. A later message for the same key wins.
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Field keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(key, message)| (key.as_str(), message.as_str()))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// An entity rule set.
pub trait Validate {
    /// Runs every rule and returns the complete error map.
    fn validate(&self) -> ValidationErrors;

    /// Returns whether the value passes every rule.
    fn is_save_eligible(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Key for a per-element field, namespaced by element position.
pub fn element_key(field: &str, index: usize) -> String {
    format!("{field}_{index}")
}

/// Returns whether `value` has the `local@domain.tld` shape.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Splits comma-delimited input into trimmed, non-empty tokens.
pub fn parse_delimited(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Required non-empty text, checked after trimming.
pub(crate) fn require_text(
    errors: &mut ValidationErrors,
    key: impl Into<String>,
    value: &str,
    message: &str,
) {
    if value.trim().is_empty() {
        errors.insert(key, message);
    }
}

/// Required email. The format check only runs once the value is non-empty.
pub(crate) fn require_email(
    errors: &mut ValidationErrors,
    key: &str,
    value: &str,
    empty_message: &str,
    malformed_message: &str,
) {
    if value.trim().is_empty() {
        errors.insert(key, empty_message);
    } else if !is_valid_email(value) {
        errors.insert(key, malformed_message);
    }
}

/// Required comma-delimited list.
///
/// Checks the raw text, not the parsed tokens: input made only of commas and
/// whitespace passes here yet parses to an empty list.
pub(crate) fn require_delimited(
    errors: &mut ValidationErrors,
    key: &str,
    raw: &str,
    message: &str,
) {
    require_text(errors, key, raw, message);
}
