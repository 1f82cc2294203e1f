//! Skill groups (read-only to editors).

use crate::model::ids::ElementId;
use crate::validation::{require_text, Validate, ValidationErrors};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub id: ElementId,
    pub title: String,
    pub skills: Vec<String>,
}

impl SkillGroup {
    pub fn new(
        title: impl Into<String>,
        skills: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: ElementId::default(),
            title: title.into(),
            skills: skills.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validate for SkillGroup {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "title", &self.title, "Skill group title is required");
        errors
    }
}
