use async_trait::async_trait;
use folio_core::db::open_db_in_memory;
use folio_core::{
    AcademicField, AcademicRecord, DeleteOutcome, Education, EducationBinding, EducationField,
    EducationRepository, ElementId, PersonalDetails, PersonalDetailsBinding,
    PersonalDetailsRepository, PersonalField, Project, ProjectField, ProjectRepository,
    ProjectTarget, ProjectsBinding, RepoError, RepoResult, SaveFailure, SaveOutcome, SqliteStore,
    SyncController, SyncError, SyncState,
};
use futures::executor::block_on;
use std::cell::{Cell, RefCell};

/// In-memory repository whose next call can be scripted to fail.
#[derive(Default)]
struct ScriptedRepo {
    personal: RefCell<Option<PersonalDetails>>,
    education: RefCell<Option<Education>>,
    projects: RefCell<Vec<Project>>,
    fail_next: RefCell<Option<RepoError>>,
    /// While set, every project list read fails.
    fail_lists: Cell<bool>,
    writes: Cell<usize>,
}

impl ScriptedRepo {
    fn with_education(education: Education) -> Self {
        let repo = Self::default();
        *repo.education.borrow_mut() = Some(education);
        repo
    }

    fn fail_next(&self, err: RepoError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    fn take_failure(&self) -> RepoResult<()> {
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl PersonalDetailsRepository for ScriptedRepo {
    async fn fetch_personal_details(&self) -> RepoResult<Option<PersonalDetails>> {
        self.take_failure()?;
        Ok(self.personal.borrow().clone())
    }

    async fn upsert_personal_details(
        &self,
        details: &PersonalDetails,
    ) -> RepoResult<PersonalDetails> {
        self.take_failure()?;
        self.writes.set(self.writes.get() + 1);
        *self.personal.borrow_mut() = Some(details.clone());
        Ok(details.clone())
    }
}

#[async_trait(?Send)]
impl EducationRepository for ScriptedRepo {
    async fn fetch_education(&self) -> RepoResult<Option<Education>> {
        self.take_failure()?;
        Ok(self.education.borrow().clone())
    }

    async fn upsert_education(&self, education: &Education) -> RepoResult<Education> {
        self.take_failure()?;
        self.writes.set(self.writes.get() + 1);
        *self.education.borrow_mut() = Some(education.clone());
        Ok(education.clone())
    }
}

#[async_trait(?Send)]
impl ProjectRepository for ScriptedRepo {
    async fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.take_failure()?;
        if self.fail_lists.get() {
            return Err(RepoError::Unavailable("list timed out".to_string()));
        }
        Ok(self.projects.borrow().clone())
    }

    async fn save_project(&self, project: &Project) -> RepoResult<Project> {
        self.take_failure()?;
        self.writes.set(self.writes.get() + 1);
        let mut projects = self.projects.borrow_mut();
        match &project.id {
            Some(id) => {
                let slot = projects
                    .iter_mut()
                    .find(|stored| stored.id.as_ref() == Some(id))
                    .ok_or_else(|| RepoError::NotFound(id.clone()))?;
                *slot = project.clone();
                Ok(project.clone())
            }
            None => {
                let saved = Project {
                    id: Some(ElementId::generate()),
                    ..project.clone()
                };
                projects.push(saved.clone());
                Ok(saved)
            }
        }
    }

    async fn delete_project(&self, id: &ElementId) -> RepoResult<()> {
        self.take_failure()?;
        self.writes.set(self.writes.get() + 1);
        let mut projects = self.projects.borrow_mut();
        let before = projects.len();
        projects.retain(|stored| stored.id.as_ref() != Some(id));
        if projects.len() == before {
            return Err(RepoError::NotFound(id.clone()));
        }
        Ok(())
    }
}

fn committed_education() -> Education {
    Education {
        core_objective: "Ship reliable software.".to_string(),
        academic: vec![AcademicRecord {
            id: ElementId::new("a"),
            ..AcademicRecord::new("B.Sc", "X", "2020-2024", "3.9")
        }],
    }
}

fn valid_personal() -> PersonalDetails {
    PersonalDetails {
        name: "Ada".to_string(),
        role: "Engineer".to_string(),
        email: "ada@example.com".to_string(),
        ..PersonalDetails::default()
    }
}

#[test]
fn load_moves_to_viewing_with_draft_equal_to_committed() {
    let repo = ScriptedRepo::with_education(committed_education());
    let mut controller = SyncController::new(EducationBinding::new(&repo));
    assert_eq!(controller.state(), SyncState::Loading);

    block_on(controller.load()).unwrap();

    assert_eq!(controller.state(), SyncState::Viewing);
    assert_eq!(controller.committed(), &committed_education());
    assert_eq!(controller.draft(), controller.committed());
}

#[test]
fn blank_objective_blocks_save_then_fixed_draft_saves() {
    let repo = ScriptedRepo::with_education(committed_education());
    let mut controller = SyncController::new(EducationBinding::new(&repo));
    block_on(controller.load()).unwrap();
    controller.edit().unwrap();

    controller
        .draft_mut()
        .unwrap()
        .set_field(EducationField::CoreObjective, "");
    let outcome = block_on(controller.save()).unwrap();

    match outcome {
        SaveOutcome::Invalid(errors) => {
            assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["coreObjective"]);
        }
        other => panic!("expected blocked save, got {other:?}"),
    }
    assert_eq!(repo.writes.get(), 0);
    assert_eq!(controller.state(), SyncState::Editing);
    assert!(controller.errors().contains_key("coreObjective"));

    controller
        .draft_mut()
        .unwrap()
        .set_field(EducationField::CoreObjective, "Build durable tools.");
    let outcome = block_on(controller.save()).unwrap();

    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(repo.writes.get(), 1);
    assert_eq!(controller.state(), SyncState::Viewing);
    assert_eq!(controller.committed().core_objective, "Build durable tools.");
    assert_eq!(controller.draft(), controller.committed());
    assert!(controller.errors().is_empty());
}

#[test]
fn cancel_discards_draft_and_errors() {
    let repo = ScriptedRepo::with_education(committed_education());
    let mut controller = SyncController::new(EducationBinding::new(&repo));
    block_on(controller.load()).unwrap();
    controller.edit().unwrap();

    let draft = controller.draft_mut().unwrap();
    draft.add_element(AcademicRecord::default());
    draft.update_element(&ElementId::new("a"), AcademicField::Degree, "");
    controller.validate();
    assert!(!controller.errors().is_empty());

    controller.cancel().unwrap();

    assert_eq!(controller.state(), SyncState::Viewing);
    assert_eq!(controller.draft(), &committed_education());
    assert!(controller.errors().is_empty());
    assert_eq!(repo.writes.get(), 0);
}

#[test]
fn fetch_failure_falls_back_to_the_empty_record() {
    let repo = ScriptedRepo::with_education(committed_education());
    repo.fail_next(RepoError::Unavailable("offline".to_string()));
    let mut controller = SyncController::new(EducationBinding::new(&repo));

    block_on(controller.load()).unwrap();

    assert_eq!(controller.state(), SyncState::Viewing);
    assert_eq!(controller.committed(), &Education::default());

    block_on(controller.load()).unwrap();
    assert_eq!(controller.committed(), &committed_education());
}

#[test]
fn failed_write_keeps_draft_and_errors_then_retry_succeeds() {
    let repo = ScriptedRepo::default();
    let mut controller = SyncController::new(PersonalDetailsBinding::new(&repo));
    block_on(controller.load()).unwrap();
    controller.edit().unwrap();
    {
        let draft = controller.draft_mut().unwrap();
        draft.set_field(PersonalField::Name, "Ada");
        draft.set_field(PersonalField::Role, "Engineer");
        draft.set_field(PersonalField::Email, "ada@example.com");
    }
    let draft_before = controller.draft().clone();

    repo.fail_next(RepoError::Unavailable("connection reset".to_string()));
    let outcome = block_on(controller.save()).unwrap();

    assert_eq!(outcome, SaveOutcome::Failed(SaveFailure::Failed));
    assert_eq!(controller.state(), SyncState::Editing);
    assert_eq!(controller.draft(), &draft_before);
    assert!(controller.errors().is_empty());
    assert_eq!(controller.committed(), &PersonalDetails::default());
    assert_eq!(
        controller.last_failure().map(SaveFailure::notice).as_deref(),
        Some("Failed to save changes.")
    );

    let outcome = block_on(controller.save()).unwrap();

    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(controller.committed(), &draft_before);
    assert!(controller.last_failure().is_none());
}

#[test]
fn unique_conflict_is_reported_against_its_field() {
    let repo = ScriptedRepo::default();
    let mut controller = SyncController::new(PersonalDetailsBinding::new(&repo));
    block_on(controller.load()).unwrap();
    controller.edit().unwrap();
    {
        let draft = controller.draft_mut().unwrap();
        draft.set_field(PersonalField::Name, "Ada");
        draft.set_field(PersonalField::Role, "Engineer");
        draft.set_field(PersonalField::Email, "taken@example.com");
    }

    repo.fail_next(RepoError::Conflict {
        field: "email".to_string(),
    });
    let outcome = block_on(controller.save()).unwrap();

    let failure = match outcome {
        SaveOutcome::Failed(failure) => failure,
        other => panic!("expected failed save, got {other:?}"),
    };
    assert_eq!(failure.field(), Some("email"));
    assert!(failure.notice().starts_with("Failed to save changes."));
    assert!(controller.errors().is_empty());
    assert_eq!(controller.state(), SyncState::Editing);
}

#[test]
fn operations_outside_their_state_are_refused() {
    let repo = ScriptedRepo::default();
    let mut controller = SyncController::new(PersonalDetailsBinding::new(&repo));

    assert_eq!(
        controller.edit(),
        Err(SyncError::InvalidState {
            operation: "edit",
            state: SyncState::Loading,
        })
    );

    block_on(controller.load()).unwrap();
    assert!(matches!(
        controller.draft_mut(),
        Err(SyncError::InvalidState { .. })
    ));
    assert!(matches!(
        block_on(controller.save()),
        Err(SyncError::InvalidState { .. })
    ));
    assert!(matches!(
        controller.cancel(),
        Err(SyncError::InvalidState { .. })
    ));

    controller.edit().unwrap();
    assert!(matches!(
        block_on(controller.load()),
        Err(SyncError::InvalidState { .. })
    ));
    assert_eq!(repo.writes.get(), 0);
}

#[test]
fn store_trimming_reseeds_the_draft_after_save() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let mut controller = SyncController::new(EducationBinding::new(&store));
    block_on(controller.load()).unwrap();
    controller.edit().unwrap();
    {
        let draft = controller.draft_mut().unwrap();
        draft.set_field(EducationField::CoreObjective, "  Build durable tools.  ");
        let id = draft.add_element(AcademicRecord::new(" B.Sc ", "X", "2020-2024", "3.9"));
        assert!(!id.is_blank());
    }

    let outcome = block_on(controller.save()).unwrap();

    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(controller.committed().core_objective, "Build durable tools.");
    assert_eq!(controller.committed().academic[0].degree, "B.Sc");
    assert_eq!(controller.draft(), controller.committed());
}

#[test]
fn personal_details_round_trip_through_the_store() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    block_on(store.upsert_personal_details(&valid_personal())).unwrap();

    let mut controller = SyncController::new(PersonalDetailsBinding::new(&store));
    block_on(controller.load()).unwrap();
    assert_eq!(controller.committed(), &valid_personal());

    controller.edit().unwrap();
    controller
        .draft_mut()
        .unwrap()
        .set_field(PersonalField::Bio, "Writes compilers.");
    assert_eq!(block_on(controller.save()).unwrap(), SaveOutcome::Saved);

    let stored = block_on(store.fetch_personal_details()).unwrap().unwrap();
    assert_eq!(stored.bio, "Writes compilers.");
}

fn fill_project<R: ProjectRepository + ?Sized>(
    controller: &mut SyncController<ProjectsBinding<'_, R>>,
    title: &str,
) {
    let draft = controller.draft_mut().unwrap();
    draft.set_field(ProjectField::Title, title);
    draft.set_field(ProjectField::Description, "Portfolio console");
    draft.set_field(ProjectField::ImageUrl, "data:image/png;base64,AAAA");
    draft.set_field(ProjectField::Tags, "web, cms");
    draft.set_field(ProjectField::TechStack, "rust, sqlite");
}

#[test]
fn projects_create_edit_and_delete_through_the_controller() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let mut controller = SyncController::new(ProjectsBinding::new(&store));
    block_on(controller.load()).unwrap();
    assert!(controller.committed().is_empty());

    controller.edit().unwrap();
    assert_eq!(controller.target(), &ProjectTarget::New);
    assert_eq!(controller.draft().category, "Full Stack");
    fill_project(&mut controller, "Folio");
    assert_eq!(block_on(controller.save()).unwrap(), SaveOutcome::Saved);

    let created = controller.committed()[0].clone();
    let id = created.id.clone().unwrap();
    assert_eq!(created.tags, vec!["web", "cms"]);
    assert_eq!(created.tech_stack, vec!["rust", "sqlite"]);

    controller
        .begin_edit(ProjectTarget::Existing(id.clone()))
        .unwrap();
    assert_eq!(controller.draft().tags_input, "web, cms");
    controller
        .draft_mut()
        .unwrap()
        .set_field(ProjectField::Title, "Folio 2");
    assert_eq!(block_on(controller.save()).unwrap(), SaveOutcome::Saved);
    assert_eq!(controller.committed().len(), 1);
    assert_eq!(controller.committed()[0].title, "Folio 2");
    assert_eq!(controller.committed()[0].id.as_ref(), Some(&id));

    assert_eq!(
        block_on(controller.delete(&id, false)).unwrap(),
        DeleteOutcome::Declined
    );
    assert_eq!(controller.committed().len(), 1);

    assert_eq!(
        block_on(controller.delete(&id, true)).unwrap(),
        DeleteOutcome::Deleted
    );
    assert!(controller.committed().is_empty());
    assert_eq!(controller.state(), SyncState::Viewing);
}

#[test]
fn editing_an_unknown_project_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let mut controller = SyncController::new(ProjectsBinding::new(&store));
    block_on(controller.load()).unwrap();

    let err = controller
        .begin_edit(ProjectTarget::Existing(ElementId::new("missing")))
        .unwrap_err();

    assert!(matches!(err, SyncError::TargetNotFound(_)));
    assert_eq!(controller.state(), SyncState::Viewing);
}

#[test]
fn stale_project_edit_and_delete_report_stale() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::try_new(&conn).unwrap();
    let mut controller = SyncController::new(ProjectsBinding::new(&store));
    block_on(controller.load()).unwrap();
    controller.edit().unwrap();
    fill_project(&mut controller, "Folio");
    block_on(controller.save()).unwrap();
    let id = controller.committed()[0].id.clone().unwrap();

    controller
        .begin_edit(ProjectTarget::Existing(id.clone()))
        .unwrap();
    block_on(store.delete_project(&id)).unwrap();
    let outcome = block_on(controller.save()).unwrap();

    assert_eq!(
        outcome,
        SaveOutcome::Failed(SaveFailure::Stale {
            id: id.to_string()
        })
    );
    assert_eq!(controller.state(), SyncState::Editing);
    assert_eq!(controller.draft().title, "Folio");

    controller.cancel().unwrap();
    let outcome = block_on(controller.delete(&id, true)).unwrap();
    assert!(matches!(
        outcome,
        DeleteOutcome::Failed(SaveFailure::Stale { .. })
    ));
    assert_eq!(controller.state(), SyncState::Viewing);
    assert_eq!(controller.committed().len(), 1);
}

#[test]
fn failed_project_write_keeps_draft_and_commits_nothing() {
    let repo = ScriptedRepo::default();
    let mut controller = SyncController::new(ProjectsBinding::new(&repo));
    block_on(controller.load()).unwrap();
    controller.edit().unwrap();
    fill_project(&mut controller, "Folio");
    let draft_before = controller.draft().clone();

    repo.fail_next(RepoError::Unavailable("connection reset".to_string()));
    let outcome = block_on(controller.save()).unwrap();

    assert_eq!(outcome, SaveOutcome::Failed(SaveFailure::Failed));
    assert_eq!(controller.state(), SyncState::Editing);
    assert_eq!(controller.target(), &ProjectTarget::New);
    assert_eq!(controller.draft(), &draft_before);
    assert!(controller.committed().is_empty());
    assert!(repo.projects.borrow().is_empty());

    assert_eq!(block_on(controller.save()).unwrap(), SaveOutcome::Saved);
    assert_eq!(repo.projects.borrow().len(), 1);
    assert_eq!(controller.committed(), &*repo.projects.borrow());
}

#[test]
fn accepted_project_write_is_reported_saved_even_when_lists_fail() {
    let repo = ScriptedRepo::default();
    let mut controller = SyncController::new(ProjectsBinding::new(&repo));
    block_on(controller.load()).unwrap();
    repo.fail_lists.set(true);

    controller.edit().unwrap();
    fill_project(&mut controller, "Folio");
    assert_eq!(block_on(controller.save()).unwrap(), SaveOutcome::Saved);

    assert_eq!(controller.state(), SyncState::Viewing);
    assert_eq!(repo.writes.get(), 1);
    assert_eq!(repo.projects.borrow().len(), 1);
    assert_eq!(controller.committed(), &*repo.projects.borrow());

    let id = controller.committed()[0].id.clone().unwrap();
    controller
        .begin_edit(ProjectTarget::Existing(id.clone()))
        .unwrap();
    controller
        .draft_mut()
        .unwrap()
        .set_field(ProjectField::Title, "Folio 2");
    assert_eq!(block_on(controller.save()).unwrap(), SaveOutcome::Saved);

    assert_eq!(repo.projects.borrow().len(), 1);
    assert_eq!(repo.projects.borrow()[0].title, "Folio 2");
    assert_eq!(controller.committed().len(), 1);
    assert_eq!(controller.committed()[0].title, "Folio 2");
    assert_eq!(controller.committed()[0].id.as_ref(), Some(&id));
}

#[test]
fn accepted_project_delete_is_reported_deleted_even_when_lists_fail() {
    let repo = ScriptedRepo::default();
    let kept = Project {
        id: Some(ElementId::new("kept")),
        title: "Kept".to_string(),
        ..Project::default()
    };
    let doomed = Project {
        id: Some(ElementId::new("doomed")),
        title: "Doomed".to_string(),
        ..Project::default()
    };
    *repo.projects.borrow_mut() = vec![kept.clone(), doomed];
    let mut controller = SyncController::new(ProjectsBinding::new(&repo));
    block_on(controller.load()).unwrap();
    repo.fail_lists.set(true);

    let outcome = block_on(controller.delete(&ElementId::new("doomed"), true)).unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(controller.state(), SyncState::Viewing);
    assert_eq!(controller.committed(), &vec![kept.clone()]);
    assert_eq!(*repo.projects.borrow(), vec![kept]);
    assert!(controller.last_failure().is_none());
}
