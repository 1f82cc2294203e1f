//! Command handlers.
//!
//! Edits follow the controller lifecycle: load, begin edit, mutate the
//! draft, save. Validation failures are printed per field and turn into a
//! non-zero exit.

use crate::{
    AcademicArgs, EducationAction, PersonalAction, PersonalArgs, ProjectAction, ProjectArgs,
    ResumeAction, SkillAction,
};
use anyhow::{anyhow, bail, Context, Result};
use folio_core::media::pdf_view_uri;
use folio_core::{
    load_dashboard, AcademicField, AcademicRecord, Binding, DataUri, DeleteOutcome,
    EducationBinding, EducationField, ElementId, PersonalDetailsBinding, PersonalField,
    ProjectField, ProjectTarget, ProjectsBinding, Resume, ResumeRepository, SaveOutcome,
    SkillGroup, SkillGroupRepository, SqliteStore, SyncController, ValidationErrors,
};
use futures::executor::block_on;
use log::info;
use std::path::Path;

pub(crate) fn dashboard(store: &SqliteStore<'_>) -> Result<()> {
    let snapshot = block_on(load_dashboard(store));

    println!("Welcome back, {}", snapshot.display_name());
    println!(
        "projects={} skills={} academic={} resumes={}",
        snapshot.project_count(),
        snapshot.total_skills(),
        snapshot.academic_count(),
        snapshot.resume_count()
    );

    println!("\nRecent projects:");
    for project in snapshot.featured_projects() {
        println!("  {} [{}]", project.title, project.tech_preview.join(", "));
    }

    println!("\nSkills:");
    for bar in snapshot.skill_bars() {
        println!(
            "  {:<20} {:>3}% ({} skills)",
            bar.title, bar.percent, bar.skill_count
        );
    }

    match snapshot.active_resume() {
        Some(resume) => println!("\nActive resume: {}", resume.file_name),
        None => println!("\nActive resume: none"),
    }
    Ok(())
}

pub(crate) fn personal(store: &SqliteStore<'_>, action: PersonalAction) -> Result<()> {
    let mut controller = load(PersonalDetailsBinding::new(store))?;
    match action {
        PersonalAction::Show => {
            let details = controller.committed();
            println!("name:     {}", details.name);
            println!("role:     {}", details.role);
            println!("email:    {}", details.email);
            println!("bio:      {}", details.bio);
            println!("github:   {}", details.github_url);
            println!("linkedin: {}", details.linkedin_url);
            println!("avatar:   {}", describe_media(&details.avatar_url));
            Ok(())
        }
        PersonalAction::Set(args) => {
            let PersonalArgs {
                name,
                role,
                email,
                bio,
                github,
                linkedin,
                avatar,
            } = args;
            let avatar = avatar.map(|path| embed_file(&path)).transpose()?;

            controller.edit()?;
            let draft = controller.draft_mut()?;
            for (field, value) in [
                (PersonalField::Name, name),
                (PersonalField::Role, role),
                (PersonalField::Email, email),
                (PersonalField::Bio, bio),
                (PersonalField::GithubUrl, github),
                (PersonalField::LinkedinUrl, linkedin),
                (PersonalField::AvatarUrl, avatar),
            ] {
                if let Some(value) = value {
                    draft.set_field(field, value);
                }
            }
            save(&mut controller)?;
            println!("Personal details saved.");
            Ok(())
        }
    }
}

pub(crate) fn education(store: &SqliteStore<'_>, action: EducationAction) -> Result<()> {
    let mut controller = load(EducationBinding::new(store))?;
    match action {
        EducationAction::Show => {
            let education = controller.committed();
            println!("Core objective: {}", education.core_objective);
            for record in &education.academic {
                println!(
                    "  {}  {} @ {} ({}) result={}",
                    record.id, record.degree, record.institution, record.duration, record.cgpa
                );
            }
            Ok(())
        }
        EducationAction::Objective { text } => {
            controller.edit()?;
            controller
                .draft_mut()?
                .set_field(EducationField::CoreObjective, text);
            save(&mut controller)?;
            println!("Core objective saved.");
            Ok(())
        }
        EducationAction::Add(fields) => {
            controller.edit()?;
            let id = controller.draft_mut()?.add_element(AcademicRecord::new(
                fields.degree.unwrap_or_default(),
                fields.institution.unwrap_or_default(),
                fields.duration.unwrap_or_default(),
                fields.cgpa.unwrap_or_default(),
            ));
            save(&mut controller)?;
            println!("Academic record {id} added.");
            Ok(())
        }
        EducationAction::Update { id, fields } => {
            let id = ElementId::new(id);
            controller.edit()?;
            let draft = controller.draft_mut()?;
            if !draft.element_ids().contains(&id) {
                bail!("No academic record with id '{id}'");
            }
            for (field, value) in academic_updates(fields) {
                draft.update_element(&id, field, value);
            }
            save(&mut controller)?;
            println!("Academic record {id} updated.");
            Ok(())
        }
        EducationAction::Remove { id } => {
            let id = ElementId::new(id);
            controller.edit()?;
            if !controller.draft_mut()?.remove_element(&id) {
                bail!("No academic record with id '{id}'");
            }
            save(&mut controller)?;
            println!("Academic record {id} removed.");
            Ok(())
        }
    }
}

fn academic_updates(fields: AcademicArgs) -> Vec<(AcademicField, String)> {
    [
        (AcademicField::Degree, fields.degree),
        (AcademicField::Institution, fields.institution),
        (AcademicField::Duration, fields.duration),
        (AcademicField::Cgpa, fields.cgpa),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|value| (field, value)))
    .collect()
}

pub(crate) fn projects(store: &SqliteStore<'_>, action: ProjectAction) -> Result<()> {
    let mut controller = load(ProjectsBinding::new(store))?;
    match action {
        ProjectAction::List => {
            for project in controller.committed() {
                let id = project.id.as_ref().map(ElementId::as_str).unwrap_or("-");
                println!("{id}  {} [{}]", project.title, project.category);
                println!("    tags: {}", project.tags.join(", "));
                println!("    tech: {}", project.tech_stack.join(", "));
                if !project.code_url.is_empty() {
                    println!("    code: {}", project.code_url);
                }
                if !project.demo_url.is_empty() {
                    println!("    demo: {}", project.demo_url);
                }
            }
            Ok(())
        }
        ProjectAction::Save(args) => {
            let ProjectArgs {
                id,
                title,
                description,
                image,
                image_url,
                tags,
                tech,
                category,
                code_url,
                demo_url,
            } = args;
            let image_url = match image {
                Some(path) => Some(embed_file(&path)?),
                None => image_url,
            };
            let target = match id {
                Some(id) => ProjectTarget::Existing(ElementId::new(id)),
                None => ProjectTarget::New,
            };

            controller.begin_edit(target)?;
            let draft = controller.draft_mut()?;
            for (field, value) in [
                (ProjectField::Title, title),
                (ProjectField::Description, description),
                (ProjectField::ImageUrl, image_url),
                (ProjectField::Tags, tags),
                (ProjectField::TechStack, tech),
                (ProjectField::Category, category),
                (ProjectField::CodeUrl, code_url),
                (ProjectField::DemoUrl, demo_url),
            ] {
                if let Some(value) = value {
                    draft.set_field(field, value);
                }
            }
            save(&mut controller)?;
            println!("Project saved. {} project(s) total.", controller.committed().len());
            Ok(())
        }
        ProjectAction::Delete { id, yes } => {
            let id = ElementId::new(id);
            match block_on(controller.delete(&id, yes))? {
                DeleteOutcome::Deleted => {
                    println!("Project {id} deleted.");
                    Ok(())
                }
                DeleteOutcome::Declined => {
                    println!("Not deleted. Pass --yes to confirm.");
                    Ok(())
                }
                DeleteOutcome::Failed(failure) => Err(anyhow!(failure.notice())),
            }
        }
    }
}

pub(crate) fn skills(store: &SqliteStore<'_>, action: SkillAction) -> Result<()> {
    match action {
        SkillAction::List => {
            for group in block_on(store.list_skill_groups())? {
                println!("{}  {}: {}", group.id, group.title, group.skills.join(", "));
            }
            Ok(())
        }
        SkillAction::Add { title, skills } => {
            let group = store.insert_skill_group(&SkillGroup::new(title, skills))?;
            info!("event=skill_group_add module=cli status=ok skills={}", group.skills.len());
            println!("Skill group {} added.", group.id);
            Ok(())
        }
    }
}

pub(crate) fn resumes(store: &SqliteStore<'_>, action: ResumeAction) -> Result<()> {
    match action {
        ResumeAction::List => {
            for resume in block_on(store.list_resumes())? {
                let marker = if resume.is_active { "*" } else { " " };
                println!(
                    "{marker} {}  {} (uploaded_at={})",
                    resume.id, resume.file_name, resume.uploaded_at
                );
            }
            Ok(())
        }
        ResumeAction::Add { file, active } => {
            let uri = DataUri::from_file(&file)
                .with_context(|| format!("Failed to read '{}'", file.display()))?;
            if !uri.is_pdf() {
                bail!("Resumes must be PDF files");
            }
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let resume = store.insert_resume(&Resume {
                is_active: active,
                ..Resume::new(file_name, uri.to_string())
            })?;
            info!(
                "event=resume_add module=cli status=ok active={} bytes={}",
                resume.is_active,
                uri.data().len()
            );
            println!("Resume {} uploaded.", resume.id);
            Ok(())
        }
        ResumeAction::Activate { id } => {
            store.set_active_resume(&ElementId::new(id.as_str()))?;
            println!("Resume {id} is now active.");
            Ok(())
        }
        ResumeAction::Export { id, out } => {
            let id = ElementId::new(id);
            let resume = block_on(store.list_resumes())?
                .into_iter()
                .find(|resume| resume.id == id)
                .ok_or_else(|| anyhow!("No resume with id '{id}'"))?;
            let uri = pdf_view_uri(&resume.url)
                .ok_or_else(|| anyhow!("Resume '{id}' has no stored file"))?;
            let pdf = DataUri::parse(&uri)?;
            std::fs::write(&out, pdf.data())
                .with_context(|| format!("Failed to write '{}'", out.display()))?;
            println!("Resume {id} written to {}.", out.display());
            Ok(())
        }
    }
}

fn load<B: Binding>(binding: B) -> Result<SyncController<B>> {
    let mut controller = SyncController::new(binding);
    block_on(controller.load())?;
    Ok(controller)
}

fn save<B: Binding>(controller: &mut SyncController<B>) -> Result<()> {
    match block_on(controller.save())? {
        SaveOutcome::Saved => Ok(()),
        SaveOutcome::Invalid(errors) => {
            print_errors(&errors);
            bail!("Changes not saved: {} field(s) need attention", errors.len())
        }
        SaveOutcome::Failed(failure) => {
            if let Some(field) = failure.field() {
                eprintln!("  {field}: already in use");
            }
            Err(anyhow!(failure.notice()))
        }
    }
}

fn print_errors(errors: &ValidationErrors) {
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

fn embed_file(path: &Path) -> Result<String> {
    let uri = DataUri::from_file(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    Ok(uri.to_string())
}

fn describe_media(value: &str) -> String {
    if value.is_empty() {
        return "none".to_string();
    }
    match DataUri::parse(value) {
        Ok(uri) => format!("{} ({} bytes)", uri.mime(), uri.data().len()),
        Err(_) => value.to_string(),
    }
}
