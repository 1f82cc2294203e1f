use folio_core::validation::parse_delimited;
use folio_core::{
    AcademicRecord, Education, ElementId, PersonalDetails, Project, ProjectDraft, Validate,
};

fn filled_record() -> AcademicRecord {
    AcademicRecord {
        id: ElementId::new("r1"),
        ..AcademicRecord::new("B.Sc", "X", "2020-2024", "3.9")
    }
}

#[test]
fn education_with_blank_objective_reports_only_the_objective() {
    let draft = Education {
        core_objective: String::new(),
        academic: vec![filled_record()],
    };

    let errors = draft.validate();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("coreObjective"), Some("Core Objective is required"));
    assert!(!draft.is_save_eligible());
}

#[test]
fn every_blank_academic_field_is_reported_per_position() {
    let draft = Education {
        core_objective: "Build things.".to_string(),
        academic: vec![
            filled_record(),
            AcademicRecord {
                id: ElementId::new("r2"),
                ..AcademicRecord::new("  ", "", "2019", " ")
            },
        ],
    };

    let errors = draft.validate();

    let keys: Vec<&str> = errors.keys().collect();
    assert_eq!(keys, vec!["cgpa_1", "degree_1", "institution_1"]);
    assert_eq!(errors.get("cgpa_1"), Some("Result (CGPA/%) is required"));
    assert_eq!(errors.get("degree_1"), Some("Degree is required"));
    assert_eq!(errors.get("institution_1"), Some("Institution is required"));
}

#[test]
fn personal_rules_all_run_and_email_reports_one_message() {
    let empty = PersonalDetails::default().validate();
    assert_eq!(empty.len(), 3);
    assert_eq!(empty.get("name"), Some("Full Name is required"));
    assert_eq!(empty.get("role"), Some("Professional Role is required"));
    assert_eq!(empty.get("email"), Some("Email address is required"));

    let malformed = PersonalDetails {
        name: "Ada".to_string(),
        role: "Engineer".to_string(),
        email: "ada.example.com".to_string(),
        ..PersonalDetails::default()
    };
    let errors = malformed.validate();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("email"), Some("Invalid email format"));

    let valid = PersonalDetails {
        email: "ada@example.com".to_string(),
        ..malformed
    };
    assert!(valid.is_save_eligible());
}

#[test]
fn project_draft_reports_every_missing_field() {
    let draft = ProjectDraft {
        category: String::new(),
        ..ProjectDraft::default()
    };

    let errors = draft.validate();

    assert_eq!(errors.len(), 6);
    assert_eq!(errors.get("title"), Some("Project title is required"));
    assert_eq!(errors.get("description"), Some("A short description is required"));
    assert_eq!(errors.get("imageUrl"), Some("Project thumbnail is required"));
    assert_eq!(errors.get("category"), Some("Category is required"));
    assert_eq!(errors.get("techStack"), Some("Add at least one technology"));
    assert_eq!(errors.get("tags"), Some("Add at least one tag"));
}

#[test]
fn comma_only_tags_pass_the_raw_text_check_but_parse_to_nothing() {
    let draft = ProjectDraft {
        title: "Folio".to_string(),
        description: "Portfolio console".to_string(),
        image_url: "data:image/png;base64,AAAA".to_string(),
        tags_input: " , , ".to_string(),
        tech_stack_input: "rust".to_string(),
        ..ProjectDraft::default()
    };

    assert!(draft.validate().is_empty());
    assert!(draft.tags().is_empty());
    assert!(parse_delimited(&draft.tags_input).is_empty());
    assert!(draft.to_project(None).tags.is_empty());
}

#[test]
fn stored_project_rules_do_not_require_tags() {
    let project = Project {
        title: "Folio".to_string(),
        description: "Portfolio console".to_string(),
        image_url: "https://example.com/thumb.png".to_string(),
        category: "Back End".to_string(),
        ..Project::default()
    };

    assert!(project.validate().is_empty());
}

#[test]
fn validation_is_deterministic() {
    let draft = Education {
        core_objective: " ".to_string(),
        academic: vec![AcademicRecord::default(), filled_record()],
    };

    assert_eq!(draft.validate(), draft.validate());
}
