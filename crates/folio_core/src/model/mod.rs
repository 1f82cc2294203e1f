//! Portfolio record models.
//!
//! # Responsibility
//! - Define the records persisted by the record store.
//! - Define the editable draft shapes and their typed field keys.
//! - Carry each entity's validation rule set.
//!
//! # Invariants
//! - Element ids are unique within their collection.
//! - Optional text fields are represented as empty strings, never `None`.

pub mod education;
pub mod ids;
pub mod personal;
pub mod project;
pub mod resume;
pub mod skill;
