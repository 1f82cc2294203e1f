//! Personal details singleton.

use crate::draft::FieldSet;
use crate::validation::{require_email, require_text, Validate, ValidationErrors};
use serde::{Deserialize, Serialize};

/// Profile owner details shown on the portfolio.
///
/// `avatar_url` holds either a plain URL or an image data URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub name: String,
    pub role: String,
    pub email: String,
    pub bio: String,
    pub avatar_url: String,
    pub github_url: String,
    pub linkedin_url: String,
}

/// Editable fields of [`PersonalDetails`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    Name,
    Role,
    Email,
    Bio,
    AvatarUrl,
    GithubUrl,
    LinkedinUrl,
}

impl FieldSet for PersonalDetails {
    type Field = PersonalField;

    fn set_field(&mut self, field: PersonalField, value: String) {
        let slot = match field {
            PersonalField::Name => &mut self.name,
            PersonalField::Role => &mut self.role,
            PersonalField::Email => &mut self.email,
            PersonalField::Bio => &mut self.bio,
            PersonalField::AvatarUrl => &mut self.avatar_url,
            PersonalField::GithubUrl => &mut self.github_url,
            PersonalField::LinkedinUrl => &mut self.linkedin_url,
        };
        *slot = value;
    }
}

impl Validate for PersonalDetails {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "name", &self.name, "Full Name is required");
        require_text(&mut errors, "role", &self.role, "Professional Role is required");
        require_email(
            &mut errors,
            "email",
            &self.email,
            "Email address is required",
            "Invalid email format",
        );
        errors
    }
}
