//! Draft/commit synchronization controller.
//!
//! # Responsibility
//! - Drive one entity through fetch, edit, validate, save and cancel.
//! - Convert every repository failure into a fetch fallback or a save notice.
//!
//! # Invariants
//! - The committed value changes only after a successful fetch or write.
//! - A save with a non-empty error map never reaches the repository.
//! - A failed write leaves the draft and the error map exactly as they were.
//! - Each save or delete makes exactly one repository call.
//! - Cancel restores the draft from the committed value and clears errors.
//! - Each controller has at most one request in flight (`&mut self`).

use crate::draft::DraftStore;
use crate::repo::{RepoError, RepoResult};
use crate::validation::{Validate, ValidationErrors};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::time::Instant;

pub mod bindings;

pub use bindings::{EducationBinding, PersonalDetailsBinding, ProjectTarget, ProjectsBinding};

/// Generic notice shown when a write fails for an unspecified reason.
pub const SAVE_FAILED_NOTICE: &str = "Failed to save changes.";

/// Lifecycle state of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Initial fetch in flight.
    Loading,
    /// Committed value shown read-only.
    Viewing,
    /// Draft open for mutation.
    Editing,
    /// Write in flight.
    Saving,
}

impl SyncState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Viewing => "viewing",
            Self::Editing => "editing",
            Self::Saving => "saving",
        }
    }
}

/// Connects a controller to one entity's repository verbs.
#[async_trait(?Send)]
pub trait Binding {
    /// Committed value kept by the controller.
    type Value: Clone + Default + PartialEq + Debug;
    /// Editable draft shape.
    type Draft: Clone + Default + PartialEq + Debug + Validate;
    /// What an edit session targets (`()` for singletons).
    type Target: Clone + Default + Debug;

    /// Entity name used in log events.
    fn entity(&self) -> &'static str;

    async fn fetch(&self) -> RepoResult<Self::Value>;

    /// Builds the draft for `target` from `committed`.
    ///
    /// Returns `None` when `target` does not exist in `committed`.
    fn seed(&self, committed: &Self::Value, target: &Self::Target) -> Option<Self::Draft>;

    /// Writes `draft` and returns the new canonical committed value.
    ///
    /// The value must be derived from the single write call and `committed`;
    /// once the store has accepted the write, no further call may fail it.
    async fn write(
        &self,
        committed: &Self::Value,
        target: &Self::Target,
        draft: &Self::Draft,
    ) -> RepoResult<Self::Value>;
}

/// A binding whose collection supports destructive single-element delete.
#[async_trait(?Send)]
pub trait RemoveBinding: Binding {
    type Key: Clone + Debug;

    /// Deletes `key` and returns `committed` without it.
    async fn remove(&self, committed: &Self::Value, key: &Self::Key) -> RepoResult<Self::Value>;
}

/// User-visible reason a write failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFailure {
    /// The store rejected the record with its own field messages.
    Rejected(ValidationErrors),
    /// A unique value is already taken.
    Conflict { field: String },
    /// The edited element no longer exists in the store.
    Stale { id: String },
    /// Transport or storage failure with no structured reason.
    Failed,
}

impl SaveFailure {
    /// Field the failure is scoped to, when the store named one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Conflict { field } => Some(field.as_str()),
            Self::Rejected(_) | Self::Stale { .. } | Self::Failed => None,
        }
    }

    /// Notice text for the user.
    pub fn notice(&self) -> String {
        match self {
            Self::Rejected(errors) => format!("{SAVE_FAILED_NOTICE} {errors}"),
            Self::Conflict { field } => {
                format!("{SAVE_FAILED_NOTICE} The {field} is already in use.")
            }
            Self::Stale { id } => {
                format!("{SAVE_FAILED_NOTICE} Record {id} no longer exists.")
            }
            Self::Failed => SAVE_FAILED_NOTICE.to_string(),
        }
    }
}

impl From<&RepoError> for SaveFailure {
    fn from(value: &RepoError) -> Self {
        match value {
            RepoError::Validation(errors) => Self::Rejected(errors.clone()),
            RepoError::Conflict { field } => Self::Conflict {
                field: field.clone(),
            },
            RepoError::NotFound(id) => Self::Stale { id: id.to_string() },
            RepoError::Db(_) | RepoError::InvalidData(_) | RepoError::Unavailable(_) => {
                Self::Failed
            }
        }
    }
}

impl Display for SaveFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.notice())
    }
}

/// Result of one save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written; committed value and draft now equal the store's value.
    Saved,
    /// Blocked locally; nothing was sent.
    Invalid(ValidationErrors),
    /// The write failed; the draft is kept for another attempt.
    Failed(SaveFailure),
}

/// Result of one delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Not confirmed; nothing was sent.
    Declined,
    Failed(SaveFailure),
}

/// An operation was requested in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    InvalidState {
        operation: &'static str,
        state: SyncState,
    },
    /// The edit target does not exist in the committed value.
    TargetNotFound(String),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState { operation, state } => {
                write!(f, "cannot {operation} while {}", state.as_str())
            }
            Self::TargetNotFound(target) => write!(f, "edit target not found: {target}"),
        }
    }
}

impl Error for SyncError {}

/// Lifecycle controller around one entity draft.
pub struct SyncController<B: Binding> {
    binding: B,
    state: SyncState,
    committed: B::Value,
    draft: DraftStore<B::Draft>,
    target: B::Target,
    errors: ValidationErrors,
    last_failure: Option<SaveFailure>,
}

impl<B: Binding> SyncController<B> {
    /// Creates a controller in `Loading` with default committed value.
    pub fn new(binding: B) -> Self {
        Self {
            binding,
            state: SyncState::Loading,
            committed: B::Value::default(),
            draft: DraftStore::default(),
            target: B::Target::default(),
            errors: ValidationErrors::new(),
            last_failure: None,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn committed(&self) -> &B::Value {
        &self.committed
    }

    pub fn draft(&self) -> &B::Draft {
        self.draft.draft()
    }

    pub fn target(&self) -> &B::Target {
        &self.target
    }

    /// Error map from the latest validation pass.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Notice from the latest failed write or delete, if still relevant.
    pub fn last_failure(&self) -> Option<&SaveFailure> {
        self.last_failure.as_ref()
    }

    /// Fetches the committed value and moves to `Viewing`.
    ///
    /// A fetch failure is logged and leaves the prior committed value in
    /// place; it is not returned as an error.
    pub async fn load(&mut self) -> Result<(), SyncError> {
        self.ensure_state("load", &[SyncState::Loading, SyncState::Viewing])?;
        self.state = SyncState::Loading;

        let entity = self.binding.entity();
        let started_at = Instant::now();
        match self.binding.fetch().await {
            Ok(value) => {
                self.committed = value;
                info!(
                    "event=sync_fetch module=sync status=ok entity={entity} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                warn!(
                    "event=sync_fetch module=sync status=error entity={entity} duration_ms={} fallback=default error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
            }
        }

        self.finish_in_viewing();
        Ok(())
    }

    /// Opens the default target for editing (the whole singleton record, or
    /// a blank element for collections).
    pub fn edit(&mut self) -> Result<(), SyncError> {
        self.begin_edit(B::Target::default())
    }

    /// Seeds the draft for `target` and moves to `Editing`.
    pub fn begin_edit(&mut self, target: B::Target) -> Result<(), SyncError> {
        self.ensure_state("edit", &[SyncState::Viewing])?;
        let seeded = self
            .binding
            .seed(&self.committed, &target)
            .ok_or_else(|| SyncError::TargetNotFound(format!("{target:?}")))?;

        self.draft.seed(&seeded);
        self.target = target;
        self.errors = ValidationErrors::new();
        self.last_failure = None;
        self.state = SyncState::Editing;
        debug!(
            "event=sync_edit module=sync status=ok entity={}",
            self.binding.entity()
        );
        Ok(())
    }

    /// Mutable access to the draft. Only available while `Editing`.
    pub fn draft_mut(&mut self) -> Result<&mut DraftStore<B::Draft>, SyncError> {
        self.ensure_state("mutate draft", &[SyncState::Editing])?;
        Ok(&mut self.draft)
    }

    /// Recomputes the error map from the current draft.
    pub fn validate(&mut self) -> &ValidationErrors {
        self.errors = self.draft.draft().validate();
        &self.errors
    }

    /// Discards the draft and returns to `Viewing`.
    pub fn cancel(&mut self) -> Result<(), SyncError> {
        self.ensure_state("cancel", &[SyncState::Editing])?;
        self.finish_in_viewing();
        debug!(
            "event=sync_cancel module=sync status=ok entity={}",
            self.binding.entity()
        );
        Ok(())
    }

    /// Validates the draft and, when it is clean, writes it.
    pub async fn save(&mut self) -> Result<SaveOutcome, SyncError> {
        self.ensure_state("save", &[SyncState::Editing])?;

        let entity = self.binding.entity();
        if !self.validate().is_empty() {
            debug!(
                "event=sync_save module=sync status=blocked entity={entity} error_count={}",
                self.errors.len()
            );
            return Ok(SaveOutcome::Invalid(self.errors.clone()));
        }

        self.state = SyncState::Saving;
        let started_at = Instant::now();
        info!("event=sync_save module=sync status=start entity={entity}");

        let written = self
            .binding
            .write(&self.committed, &self.target, self.draft.draft())
            .await;
        match written {
            Ok(value) => {
                self.committed = value;
                self.finish_in_viewing();
                info!(
                    "event=sync_save module=sync status=ok entity={entity} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(SaveOutcome::Saved)
            }
            Err(err) => {
                let failure = SaveFailure::from(&err);
                error!(
                    "event=sync_save module=sync status=error entity={entity} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                self.last_failure = Some(failure.clone());
                self.state = SyncState::Editing;
                Ok(SaveOutcome::Failed(failure))
            }
        }
    }

    fn finish_in_viewing(&mut self) {
        self.target = B::Target::default();
        let seeded = self
            .binding
            .seed(&self.committed, &self.target)
            .unwrap_or_default();
        self.draft.seed(&seeded);
        self.errors = ValidationErrors::new();
        self.last_failure = None;
        self.state = SyncState::Viewing;
    }

    fn ensure_state(
        &self,
        operation: &'static str,
        allowed: &[SyncState],
    ) -> Result<(), SyncError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SyncError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

impl<B: RemoveBinding> SyncController<B> {
    /// Deletes one element. Requires `confirmed` and the `Viewing` state.
    ///
    /// On success the element is dropped from the committed value.
    /// On failure the committed value is kept and a notice is recorded.
    pub async fn delete(
        &mut self,
        key: &B::Key,
        confirmed: bool,
    ) -> Result<DeleteOutcome, SyncError> {
        self.ensure_state("delete", &[SyncState::Viewing])?;
        if !confirmed {
            return Ok(DeleteOutcome::Declined);
        }

        let entity = self.binding.entity();
        self.state = SyncState::Saving;
        let started_at = Instant::now();
        match self.binding.remove(&self.committed, key).await {
            Ok(value) => {
                self.committed = value;
                self.finish_in_viewing();
                info!(
                    "event=sync_delete module=sync status=ok entity={entity} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                let failure = SaveFailure::from(&err);
                error!(
                    "event=sync_delete module=sync status=error entity={entity} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                self.state = SyncState::Viewing;
                self.last_failure = Some(failure.clone());
                Ok(DeleteOutcome::Failed(failure))
            }
        }
    }
}
