//! Per-entity controller bindings.
//!
//! Personal details and education are singletons written whole. Projects are
//! a collection edited one element at a time; each write or delete folds the
//! store's answer for that one element into the committed collection, so an
//! accepted write is never followed by a second call that could fail it.

use crate::model::education::Education;
use crate::model::ids::ElementId;
use crate::model::personal::PersonalDetails;
use crate::model::project::{Project, ProjectDraft};
use crate::repo::{EducationRepository, PersonalDetailsRepository, ProjectRepository, RepoResult};
use crate::sync::{Binding, RemoveBinding};
use async_trait::async_trait;

pub struct PersonalDetailsBinding<'r, R: ?Sized> {
    repo: &'r R,
}

impl<'r, R: PersonalDetailsRepository + ?Sized> PersonalDetailsBinding<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }
}

#[async_trait(?Send)]
impl<'r, R: PersonalDetailsRepository + ?Sized> Binding for PersonalDetailsBinding<'r, R> {
    type Value = PersonalDetails;
    type Draft = PersonalDetails;
    type Target = ();

    fn entity(&self) -> &'static str {
        "personal_details"
    }

    async fn fetch(&self) -> RepoResult<PersonalDetails> {
        Ok(self.repo.fetch_personal_details().await?.unwrap_or_default())
    }

    fn seed(&self, committed: &PersonalDetails, _target: &()) -> Option<PersonalDetails> {
        Some(committed.clone())
    }

    async fn write(
        &self,
        _committed: &PersonalDetails,
        _target: &(),
        draft: &PersonalDetails,
    ) -> RepoResult<PersonalDetails> {
        self.repo.upsert_personal_details(draft).await
    }
}

pub struct EducationBinding<'r, R: ?Sized> {
    repo: &'r R,
}

impl<'r, R: EducationRepository + ?Sized> EducationBinding<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }
}

#[async_trait(?Send)]
impl<'r, R: EducationRepository + ?Sized> Binding for EducationBinding<'r, R> {
    type Value = Education;
    type Draft = Education;
    type Target = ();

    fn entity(&self) -> &'static str {
        "education"
    }

    async fn fetch(&self) -> RepoResult<Education> {
        Ok(self.repo.fetch_education().await?.unwrap_or_default())
    }

    fn seed(&self, committed: &Education, _target: &()) -> Option<Education> {
        Some(committed.clone())
    }

    async fn write(
        &self,
        _committed: &Education,
        _target: &(),
        draft: &Education,
    ) -> RepoResult<Education> {
        self.repo.upsert_education(draft).await
    }
}

/// Which project an edit session works on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProjectTarget {
    /// A project that does not exist yet.
    #[default]
    New,
    Existing(ElementId),
}

pub struct ProjectsBinding<'r, R: ?Sized> {
    repo: &'r R,
}

impl<'r, R: ProjectRepository + ?Sized> ProjectsBinding<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }
}

#[async_trait(?Send)]
impl<'r, R: ProjectRepository + ?Sized> Binding for ProjectsBinding<'r, R> {
    type Value = Vec<Project>;
    type Draft = ProjectDraft;
    type Target = ProjectTarget;

    fn entity(&self) -> &'static str {
        "projects"
    }

    async fn fetch(&self) -> RepoResult<Vec<Project>> {
        self.repo.list_projects().await
    }

    fn seed(&self, committed: &Vec<Project>, target: &ProjectTarget) -> Option<ProjectDraft> {
        match target {
            ProjectTarget::New => Some(ProjectDraft::default()),
            ProjectTarget::Existing(id) => committed
                .iter()
                .find(|project| project.id.as_ref() == Some(id))
                .map(ProjectDraft::from_project),
        }
    }

    async fn write(
        &self,
        committed: &Vec<Project>,
        target: &ProjectTarget,
        draft: &ProjectDraft,
    ) -> RepoResult<Vec<Project>> {
        let id = match target {
            ProjectTarget::New => None,
            ProjectTarget::Existing(id) => Some(id.clone()),
        };
        let saved = self.repo.save_project(&draft.to_project(id)).await?;
        Ok(merge_project(committed, saved))
    }
}

#[async_trait(?Send)]
impl<'r, R: ProjectRepository + ?Sized> RemoveBinding for ProjectsBinding<'r, R> {
    type Key = ElementId;

    async fn remove(&self, committed: &Vec<Project>, key: &ElementId) -> RepoResult<Vec<Project>> {
        self.repo.delete_project(key).await?;
        Ok(committed
            .iter()
            .filter(|project| project.id.as_ref() != Some(key))
            .cloned()
            .collect())
    }
}

/// Replaces the project with `saved`'s id in place, or appends it.
fn merge_project(committed: &[Project], saved: Project) -> Vec<Project> {
    let mut merged = committed.to_vec();
    match merged
        .iter_mut()
        .find(|project| project.id.is_some() && project.id == saved.id)
    {
        Some(slot) => *slot = saved,
        None => merged.push(saved),
    }
    merged
}
