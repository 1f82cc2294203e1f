//! SQLite-backed record store.
//!
//! # Responsibility
//! - Serve every repository contract over one migrated connection.
//! - Normalize written records and return the canonical stored value.
//! - Own the single-active-resume rule.
//!
//! # Invariants
//! - Writes validate the record first and reject it with the full error map.
//! - Projects get a store-assigned id on create; academic records keep their
//!   client id unless it is blank or duplicated.
//! - Collections list in insertion order.
//! - Read paths reject undecodable rows instead of masking them.

use crate::db::migrations::{current_version, latest_version};
use crate::model::education::{AcademicRecord, Education};
use crate::model::ids::{fresh_element_id, ElementId};
use crate::model::personal::PersonalDetails;
use crate::model::project::Project;
use crate::model::resume::Resume;
use crate::model::skill::SkillGroup;
use crate::repo::{
    EducationRepository, PersonalDetailsRepository, ProjectRepository, RepoError, RepoResult,
    ResumeRepository, SkillGroupRepository,
};
use crate::validation::Validate;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    image_url,
    tags_json,
    tech_stack_json,
    category,
    code_url,
    demo_url
FROM projects";

const RESUME_SELECT_SQL: &str = "SELECT uuid, file_name, url, uploaded_at, is_active FROM resumes";

const UNIQUE_FAILURE_PREFIX: &str = "UNIQUE constraint failed: ";

/// Record store over a migrated SQLite connection.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Wraps `conn`, which must be fully migrated (see [`crate::db::open_db`]).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let version = current_version(conn)?;
        let latest = latest_version();
        if version != latest {
            return Err(RepoError::InvalidData(format!(
                "record store schema version {version} does not match expected {latest}"
            )));
        }
        Ok(Self { conn })
    }

    /// Adds one skill group and returns it with its canonical id.
    pub fn insert_skill_group(&self, group: &SkillGroup) -> RepoResult<SkillGroup> {
        ensure_valid(group)?;
        let id = canonical_id(&group.id);
        self.conn
            .execute(
                "INSERT INTO skill_groups (uuid, title, skills_json) VALUES (?1, ?2, ?3);",
                params![
                    id.as_str(),
                    group.title.trim(),
                    serde_json::to_string(&group.skills)?
                ],
            )
            .map_err(map_write_error)?;

        Ok(SkillGroup {
            id,
            title: group.title.trim().to_string(),
            skills: group.skills.clone(),
        })
    }

    /// Adds one resume. An active resume deactivates every other one.
    pub fn insert_resume(&self, resume: &Resume) -> RepoResult<Resume> {
        ensure_valid(resume)?;
        let id = canonical_id(&resume.id);

        let tx = self.conn.unchecked_transaction()?;
        if resume.is_active {
            tx.execute("UPDATE resumes SET is_active = 0 WHERE is_active = 1;", [])?;
        }
        tx.execute(
            "INSERT INTO resumes (uuid, file_name, url, uploaded_at, is_active)
             VALUES (?1, ?2, ?3, COALESCE(NULLIF(?4, 0), strftime('%s', 'now') * 1000), ?5);",
            params![
                id.as_str(),
                resume.file_name.as_str(),
                resume.url.as_str(),
                resume.uploaded_at,
                bool_to_int(resume.is_active),
            ],
        )
        .map_err(map_write_error)?;
        tx.commit()?;

        self.read_resume(&id)?
            .ok_or_else(|| RepoError::InvalidData(format!("resume {id} missing after insert")))
    }

    /// Makes `id` the only active resume.
    pub fn set_active_resume(&self, id: &ElementId) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("UPDATE resumes SET is_active = 0 WHERE is_active = 1;", [])?;
        let changed = tx.execute(
            "UPDATE resumes SET is_active = 1 WHERE uuid = ?1;",
            [id.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.clone()));
        }
        tx.commit()?;
        Ok(())
    }

    fn read_personal_details(&self) -> RepoResult<Option<PersonalDetails>> {
        let details = self
            .conn
            .query_row(
                "SELECT name, role, email, bio, avatar_url, github_url, linkedin_url
                 FROM personal_details
                 WHERE id = 1;",
                [],
                |row| {
                    Ok(PersonalDetails {
                        name: row.get("name")?,
                        role: row.get("role")?,
                        email: row.get("email")?,
                        bio: row.get("bio")?,
                        avatar_url: row.get("avatar_url")?,
                        github_url: row.get("github_url")?,
                        linkedin_url: row.get("linkedin_url")?,
                    })
                },
            )
            .optional()?;
        Ok(details)
    }

    fn read_education(&self) -> RepoResult<Option<Education>> {
        let row = self
            .conn
            .query_row(
                "SELECT core_objective, academic_json FROM education WHERE id = 1;",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        row.map(|(core_objective, academic_json)| -> RepoResult<Education> {
            let academic: Vec<AcademicRecord> =
                decode_json(&academic_json, "education.academic_json")?;
            Ok(Education {
                core_objective,
                academic,
            })
        })
        .transpose()
    }

    fn read_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn read_project(&self, id: &ElementId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_project_row(row)?)),
            None => Ok(None),
        }
    }

    fn read_resume(&self, id: &ElementId) -> RepoResult<Option<Resume>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESUME_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_resume_row(row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait(?Send)]
impl<'conn> PersonalDetailsRepository for SqliteStore<'conn> {
    async fn fetch_personal_details(&self) -> RepoResult<Option<PersonalDetails>> {
        self.read_personal_details()
    }

    async fn upsert_personal_details(
        &self,
        details: &PersonalDetails,
    ) -> RepoResult<PersonalDetails> {
        ensure_valid(details)?;

        self.conn
            .execute(
                "INSERT INTO personal_details (
                    id, name, role, email, bio, avatar_url, github_url, linkedin_url
                ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    role = excluded.role,
                    email = excluded.email,
                    bio = excluded.bio,
                    avatar_url = excluded.avatar_url,
                    github_url = excluded.github_url,
                    linkedin_url = excluded.linkedin_url,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    details.name.as_str(),
                    details.role.as_str(),
                    details.email.as_str(),
                    details.bio.as_str(),
                    details.avatar_url.as_str(),
                    details.github_url.as_str(),
                    details.linkedin_url.as_str(),
                ],
            )
            .map_err(map_write_error)?;

        self.read_personal_details()?.ok_or_else(|| {
            RepoError::InvalidData("personal details missing after upsert".to_string())
        })
    }
}

#[async_trait(?Send)]
impl<'conn> EducationRepository for SqliteStore<'conn> {
    async fn fetch_education(&self) -> RepoResult<Option<Education>> {
        self.read_education()
    }

    async fn upsert_education(&self, education: &Education) -> RepoResult<Education> {
        let normalized = normalize_education(education);
        ensure_valid(&normalized)?;

        self.conn
            .execute(
                "INSERT INTO education (id, core_objective, academic_json)
                 VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET
                    core_objective = excluded.core_objective,
                    academic_json = excluded.academic_json,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    normalized.core_objective.as_str(),
                    serde_json::to_string(&normalized.academic)?,
                ],
            )
            .map_err(map_write_error)?;

        self.read_education()?
            .ok_or_else(|| RepoError::InvalidData("education missing after upsert".to_string()))
    }
}

#[async_trait(?Send)]
impl<'conn> ProjectRepository for SqliteStore<'conn> {
    async fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.read_projects()
    }

    async fn save_project(&self, project: &Project) -> RepoResult<Project> {
        ensure_valid(project)?;
        let tags_json = serde_json::to_string(&project.tags)?;
        let tech_stack_json = serde_json::to_string(&project.tech_stack)?;

        let id = match project.id.as_ref().filter(|id| !id.is_blank()) {
            Some(id) => {
                let changed = self
                    .conn
                    .execute(
                        "UPDATE projects
                         SET
                            title = ?2,
                            description = ?3,
                            image_url = ?4,
                            tags_json = ?5,
                            tech_stack_json = ?6,
                            category = ?7,
                            code_url = ?8,
                            demo_url = ?9,
                            updated_at = (strftime('%s', 'now') * 1000)
                         WHERE uuid = ?1;",
                        params![
                            id.as_str(),
                            project.title.as_str(),
                            project.description.as_str(),
                            project.image_url.as_str(),
                            tags_json,
                            tech_stack_json,
                            project.category.as_str(),
                            project.code_url.as_str(),
                            project.demo_url.as_str(),
                        ],
                    )
                    .map_err(map_write_error)?;
                if changed == 0 {
                    return Err(RepoError::NotFound(id.clone()));
                }
                id.clone()
            }
            None => {
                let id = ElementId::generate();
                self.conn
                    .execute(
                        "INSERT INTO projects (
                            uuid, title, description, image_url, tags_json,
                            tech_stack_json, category, code_url, demo_url
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                        params![
                            id.as_str(),
                            project.title.as_str(),
                            project.description.as_str(),
                            project.image_url.as_str(),
                            tags_json,
                            tech_stack_json,
                            project.category.as_str(),
                            project.code_url.as_str(),
                            project.demo_url.as_str(),
                        ],
                    )
                    .map_err(map_write_error)?;
                id
            }
        };

        self.read_project(&id)?
            .ok_or_else(|| RepoError::InvalidData(format!("project {id} missing after save")))
    }

    async fn delete_project(&self, id: &ElementId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.as_str()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl<'conn> SkillGroupRepository for SqliteStore<'conn> {
    async fn list_skill_groups(&self) -> RepoResult<Vec<SkillGroup>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, title, skills_json FROM skill_groups ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            let skills_json: String = row.get("skills_json")?;
            groups.push(SkillGroup {
                id: ElementId::new(row.get::<_, String>("uuid")?),
                title: row.get("title")?,
                skills: decode_json(&skills_json, "skill_groups.skills_json")?,
            });
        }
        Ok(groups)
    }
}

#[async_trait(?Send)]
impl<'conn> ResumeRepository for SqliteStore<'conn> {
    async fn list_resumes(&self) -> RepoResult<Vec<Resume>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESUME_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut resumes = Vec::new();
        while let Some(row) = rows.next()? {
            resumes.push(parse_resume_row(row)?);
        }
        Ok(resumes)
    }
}

fn ensure_valid(record: &impl Validate) -> RepoResult<()> {
    let errors = record.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RepoError::Validation(errors))
    }
}

fn canonical_id(id: &ElementId) -> ElementId {
    if id.is_blank() {
        ElementId::generate()
    } else {
        id.clone()
    }
}

/// Trims the text fields the store stores trimmed and repairs element ids.
fn normalize_education(education: &Education) -> Education {
    let mut seen: HashSet<ElementId> = HashSet::new();
    let mut academic = Vec::with_capacity(education.academic.len());
    for record in &education.academic {
        let id = if record.id.is_blank() || seen.contains(&record.id) {
            let taken = education
                .academic
                .iter()
                .map(|other| &other.id)
                .chain(seen.iter());
            fresh_element_id(taken)
        } else {
            record.id.clone()
        };
        seen.insert(id.clone());
        academic.push(AcademicRecord {
            id,
            degree: record.degree.trim().to_string(),
            institution: record.institution.trim().to_string(),
            duration: record.duration.clone(),
            cgpa: record.cgpa.clone(),
        });
    }

    Education {
        core_objective: education.core_objective.trim().to_string(),
        academic,
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let tags_json: String = row.get("tags_json")?;
    let tech_stack_json: String = row.get("tech_stack_json")?;
    Ok(Project {
        id: Some(ElementId::new(row.get::<_, String>("uuid")?)),
        title: row.get("title")?,
        description: row.get("description")?,
        image_url: row.get("image_url")?,
        tags: decode_json(&tags_json, "projects.tags_json")?,
        tech_stack: decode_json(&tech_stack_json, "projects.tech_stack_json")?,
        category: row.get("category")?,
        code_url: row.get("code_url")?,
        demo_url: row.get("demo_url")?,
    })
}

fn parse_resume_row(row: &Row<'_>) -> RepoResult<Resume> {
    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in resumes.is_active"
            )));
        }
    };
    Ok(Resume {
        id: ElementId::new(row.get::<_, String>("uuid")?),
        file_name: row.get("file_name")?,
        url: row.get("url")?,
        uploaded_at: row.get("uploaded_at")?,
        is_active,
    })
}

fn decode_json<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> RepoResult<T> {
    serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("undecodable JSON in {column}: {err}")))
}

/// Maps unique and primary-key failures to a field-scoped conflict.
fn map_write_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if matches!(
            failure.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ) {
            if let Some(field) = unique_violation_field(message) {
                return RepoError::Conflict { field };
            }
        }
    }
    err.into()
}

/// Extracts the first column of `UNIQUE constraint failed: table.column`
/// as a camelCase field key.
fn unique_violation_field(message: &str) -> Option<String> {
    let columns = message.strip_prefix(UNIQUE_FAILURE_PREFIX)?;
    let qualified = columns.split(',').next()?.trim();
    let (_, column) = qualified.rsplit_once('.')?;
    Some(snake_to_camel(column))
}

fn snake_to_camel(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut upper_next = false;
    for ch in value.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
