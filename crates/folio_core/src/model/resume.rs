//! Uploaded resumes.
//!
//! At most one resume is active at a time. The record store owns that
//! exclusivity; editors only read `is_active`.

use crate::model::ids::ElementId;
use crate::validation::{require_text, Validate, ValidationErrors};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resume {
    pub id: ElementId,
    pub file_name: String,
    /// PDF content as a data URI (or raw base64 from older uploads).
    pub url: String,
    /// Unix epoch milliseconds. Zero means "stamp on insert".
    pub uploaded_at: i64,
    pub is_active: bool,
}

impl Resume {
    pub fn new(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Validate for Resume {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "fileName", &self.file_name, "File name is required");
        require_text(&mut errors, "url", &self.url, "Resume file is required");
        errors
    }
}
