//! Portfolio projects and their edit form.
//!
//! # Invariants
//! - `Project::id == None` means "not persisted yet"; saving it creates a row.
//! - Tags and tech stack are edited as comma-delimited text and only parsed
//!   into lists when the draft is turned back into a record.

use crate::draft::FieldSet;
use crate::model::ids::ElementId;
use crate::validation::{
    parse_delimited, require_delimited, require_text, Validate, ValidationErrors,
};
use serde::{Deserialize, Serialize};

/// Category preselected for new projects.
pub const DEFAULT_PROJECT_CATEGORY: &str = "Full Stack";

const LIST_SEPARATOR: &str = ", ";

/// Persisted project record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: Option<ElementId>,
    pub title: String,
    pub description: String,
    /// Thumbnail URL or image data URI.
    pub image_url: String,
    pub tags: Vec<String>,
    pub tech_stack: Vec<String>,
    pub category: String,
    pub code_url: String,
    pub demo_url: String,
}

/// Store-side rules: the record must carry its required descriptive fields.
impl Validate for Project {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "title", &self.title, "Project title is required");
        require_text(
            &mut errors,
            "description",
            &self.description,
            "A short description is required",
        );
        require_text(
            &mut errors,
            "imageUrl",
            &self.image_url,
            "Project thumbnail is required",
        );
        require_text(&mut errors, "category", &self.category, "Category is required");
        errors
    }
}

/// Edit form for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub code_url: String,
    pub demo_url: String,
    pub category: String,
    /// Raw comma-delimited tag input.
    pub tags_input: String,
    /// Raw comma-delimited tech stack input.
    pub tech_stack_input: String,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            image_url: String::new(),
            code_url: String::new(),
            demo_url: String::new(),
            category: DEFAULT_PROJECT_CATEGORY.to_string(),
            tags_input: String::new(),
            tech_stack_input: String::new(),
        }
    }
}

impl ProjectDraft {
    /// Opens an existing project for editing.
    pub fn from_project(project: &Project) -> Self {
        let category = if project.category.trim().is_empty() {
            DEFAULT_PROJECT_CATEGORY.to_string()
        } else {
            project.category.clone()
        };
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            image_url: project.image_url.clone(),
            code_url: project.code_url.clone(),
            demo_url: project.demo_url.clone(),
            category,
            tags_input: project.tags.join(LIST_SEPARATOR),
            tech_stack_input: project.tech_stack.join(LIST_SEPARATOR),
        }
    }

    /// Builds the write payload, parsing the delimited inputs.
    pub fn to_project(&self, id: Option<ElementId>) -> Project {
        Project {
            id,
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            tags: self.tags(),
            tech_stack: self.tech_stack(),
            category: self.category.clone(),
            code_url: self.code_url.clone(),
            demo_url: self.demo_url.clone(),
        }
    }

    pub fn tags(&self) -> Vec<String> {
        parse_delimited(&self.tags_input)
    }

    pub fn tech_stack(&self) -> Vec<String> {
        parse_delimited(&self.tech_stack_input)
    }
}

/// Editable fields of [`ProjectDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Title,
    Description,
    ImageUrl,
    CodeUrl,
    DemoUrl,
    Category,
    Tags,
    TechStack,
}

impl FieldSet for ProjectDraft {
    type Field = ProjectField;

    fn set_field(&mut self, field: ProjectField, value: String) {
        let slot = match field {
            ProjectField::Title => &mut self.title,
            ProjectField::Description => &mut self.description,
            ProjectField::ImageUrl => &mut self.image_url,
            ProjectField::CodeUrl => &mut self.code_url,
            ProjectField::DemoUrl => &mut self.demo_url,
            ProjectField::Category => &mut self.category,
            ProjectField::Tags => &mut self.tags_input,
            ProjectField::TechStack => &mut self.tech_stack_input,
        };
        *slot = value;
    }
}

impl Validate for ProjectDraft {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "title", &self.title, "Project title is required");
        require_text(
            &mut errors,
            "description",
            &self.description,
            "A short description is required",
        );
        require_text(
            &mut errors,
            "imageUrl",
            &self.image_url,
            "Project thumbnail is required",
        );
        require_text(&mut errors, "category", &self.category, "Category is required");
        require_delimited(
            &mut errors,
            "techStack",
            &self.tech_stack_input,
            "Add at least one technology",
        );
        require_delimited(&mut errors, "tags", &self.tags_input, "Add at least one tag");
        errors
    }
}
