//! Education singleton: core objective plus academic history.

use crate::draft::{ElementList, FieldSet, Identified};
use crate::model::ids::ElementId;
use crate::validation::{element_key, require_text, Validate, ValidationErrors};
use serde::{Deserialize, Serialize};

/// One academic qualification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicRecord {
    pub id: ElementId,
    pub degree: String,
    pub institution: String,
    pub duration: String,
    /// Free-form result text (CGPA or percentage).
    pub cgpa: String,
}

impl AcademicRecord {
    /// Builds an unsaved record with no identity assigned yet.
    pub fn new(
        degree: impl Into<String>,
        institution: impl Into<String>,
        duration: impl Into<String>,
        cgpa: impl Into<String>,
    ) -> Self {
        Self {
            id: ElementId::default(),
            degree: degree.into(),
            institution: institution.into(),
            duration: duration.into(),
            cgpa: cgpa.into(),
        }
    }
}

/// Editable fields of [`AcademicRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcademicField {
    Degree,
    Institution,
    Duration,
    Cgpa,
}

impl FieldSet for AcademicRecord {
    type Field = AcademicField;

    fn set_field(&mut self, field: AcademicField, value: String) {
        let slot = match field {
            AcademicField::Degree => &mut self.degree,
            AcademicField::Institution => &mut self.institution,
            AcademicField::Duration => &mut self.duration,
            AcademicField::Cgpa => &mut self.cgpa,
        };
        *slot = value;
    }
}

impl Identified for AcademicRecord {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn set_id(&mut self, id: ElementId) {
        self.id = id;
    }
}

/// About-me section: objective statement and ordered academic history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub core_objective: String,
    pub academic: Vec<AcademicRecord>,
}

/// Editable scalar fields of [`Education`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    CoreObjective,
}

impl FieldSet for Education {
    type Field = EducationField;

    fn set_field(&mut self, field: EducationField, value: String) {
        match field {
            EducationField::CoreObjective => self.core_objective = value,
        }
    }
}

impl ElementList for Education {
    type Element = AcademicRecord;

    fn elements(&self) -> &[AcademicRecord] {
        &self.academic
    }

    fn elements_mut(&mut self) -> &mut Vec<AcademicRecord> {
        &mut self.academic
    }
}

impl Validate for Education {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require_text(
            &mut errors,
            "coreObjective",
            &self.core_objective,
            "Core Objective is required",
        );
        for (index, record) in self.academic.iter().enumerate() {
            require_text(
                &mut errors,
                element_key("degree", index),
                &record.degree,
                "Degree is required",
            );
            require_text(
                &mut errors,
                element_key("institution", index),
                &record.institution,
                "Institution is required",
            );
            require_text(
                &mut errors,
                element_key("duration", index),
                &record.duration,
                "Duration is required",
            );
            require_text(
                &mut errors,
                element_key("cgpa", index),
                &record.cgpa,
                "Result (CGPA/%) is required",
            );
        }
        errors
    }
}
