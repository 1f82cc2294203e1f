//! Core of the Folio portfolio console.
//! Owns the draft/commit synchronization rules for every editable entity.

pub mod dashboard;
pub mod db;
pub mod draft;
pub mod logging;
pub mod media;
pub mod model;
pub mod repo;
pub mod sync;
pub mod validation;

pub use dashboard::{fetch_snapshot, load_dashboard, DashboardSnapshot};
pub use draft::{DraftStore, ElementList, FieldSet, Identified};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use media::{DataUri, MediaError};
pub use model::education::{AcademicField, AcademicRecord, Education, EducationField};
pub use model::ids::ElementId;
pub use model::personal::{PersonalDetails, PersonalField};
pub use model::project::{Project, ProjectDraft, ProjectField, DEFAULT_PROJECT_CATEGORY};
pub use model::resume::Resume;
pub use model::skill::SkillGroup;
pub use repo::sqlite_store::SqliteStore;
pub use repo::{
    EducationRepository, PersonalDetailsRepository, ProjectRepository, RecordRepository,
    RepoError, RepoResult, ResumeRepository, SkillGroupRepository,
};
pub use sync::{
    Binding, DeleteOutcome, EducationBinding, PersonalDetailsBinding, ProjectTarget,
    ProjectsBinding, RemoveBinding, SaveFailure, SaveOutcome, SyncController, SyncError,
    SyncState,
};
pub use validation::{Validate, ValidationErrors};

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
