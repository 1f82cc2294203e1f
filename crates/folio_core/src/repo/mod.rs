//! Record repository contracts and the SQLite document store.
//!
//! # Responsibility
//! - Define the read/write verbs each entity supports.
//! - Report store rejections with their structured reason.
//!
//! # Invariants
//! - Every write returns the canonical post-write value.
//! - Write paths validate the record before touching storage.
//! - Futures are not required to be `Send`; callers run on one thread.

use crate::db::DbError;
use crate::model::education::Education;
use crate::model::ids::ElementId;
use crate::model::personal::PersonalDetails;
use crate::model::project::Project;
use crate::model::resume::Resume;
use crate::model::skill::SkillGroup;
use crate::validation::ValidationErrors;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite_store;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure reported by a record repository.
#[derive(Debug)]
pub enum RepoError {
    /// The store rejected the record with its own field-scoped messages.
    Validation(ValidationErrors),
    /// A uniqueness constraint on `field` was violated.
    Conflict { field: String },
    /// The targeted element does not exist (stale identity).
    NotFound(ElementId),
    Db(DbError),
    /// Persisted data could not be decoded.
    InvalidData(String),
    /// The repository could not be reached.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "record rejected: {errors}"),
            Self::Conflict { field } => write!(f, "value for `{field}` is already in use"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::Unavailable(message) => write!(f, "record repository unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Db(err) => Some(err),
            Self::Conflict { .. }
            | Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::Unavailable(_) => None,
        }
    }
}

impl From<ValidationErrors> for RepoError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Personal details singleton verbs.
#[async_trait(?Send)]
pub trait PersonalDetailsRepository {
    /// Returns `None` when nothing has been saved yet.
    async fn fetch_personal_details(&self) -> RepoResult<Option<PersonalDetails>>;
    /// Creates or replaces the whole record.
    async fn upsert_personal_details(&self, details: &PersonalDetails)
        -> RepoResult<PersonalDetails>;
}

/// Education singleton verbs.
#[async_trait(?Send)]
pub trait EducationRepository {
    /// Returns `None` when nothing has been saved yet.
    async fn fetch_education(&self) -> RepoResult<Option<Education>>;
    /// Creates or replaces the record including its full academic list.
    async fn upsert_education(&self, education: &Education) -> RepoResult<Education>;
}

/// Project collection verbs.
#[async_trait(?Send)]
pub trait ProjectRepository {
    async fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Updates when `project.id` is set, creates otherwise.
    ///
    /// Updating an unknown id returns [`RepoError::NotFound`].
    async fn save_project(&self, project: &Project) -> RepoResult<Project>;
    async fn delete_project(&self, id: &ElementId) -> RepoResult<()>;
}

#[async_trait(?Send)]
pub trait SkillGroupRepository {
    async fn list_skill_groups(&self) -> RepoResult<Vec<SkillGroup>>;
}

#[async_trait(?Send)]
pub trait ResumeRepository {
    async fn list_resumes(&self) -> RepoResult<Vec<Resume>>;
}

/// A repository serving every portfolio entity.
pub trait RecordRepository:
    PersonalDetailsRepository
    + EducationRepository
    + ProjectRepository
    + SkillGroupRepository
    + ResumeRepository
{
}

impl<T> RecordRepository for T where
    T: PersonalDetailsRepository
        + EducationRepository
        + ProjectRepository
        + SkillGroupRepository
        + ResumeRepository
        + ?Sized
{
}
