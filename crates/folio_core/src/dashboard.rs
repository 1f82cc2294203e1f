//! Read-only overview built from every portfolio collection.
//!
//! # Responsibility
//! - Fetch all collections concurrently and join them into one snapshot.
//! - Derive the overview statistics as pure functions of that snapshot.
//!
//! # Invariants
//! - The join is all-or-nothing: one failed read fails the whole snapshot.
//! - The overview has no write path.

use crate::model::education::AcademicRecord;
use crate::model::personal::PersonalDetails;
use crate::model::project::Project;
use crate::model::resume::Resume;
use crate::model::skill::SkillGroup;
use crate::repo::{RecordRepository, RepoResult};
use log::{info, warn};
use std::time::Instant;

/// Name shown when no personal details exist.
pub const FALLBACK_DISPLAY_NAME: &str = "Admin";
/// Number of projects featured on the overview.
pub const FEATURED_PROJECT_COUNT: usize = 3;
/// Number of tech-stack entries shown per featured project.
pub const FEATURED_TECH_COUNT: usize = 2;
/// Percentage points contributed by each skill in a group bar.
pub const SKILL_BAR_POINTS_PER_SKILL: usize = 10;

/// Committed collections as read in one join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub personal: PersonalDetails,
    pub projects: Vec<Project>,
    pub skill_groups: Vec<SkillGroup>,
    pub academic: Vec<AcademicRecord>,
    pub resumes: Vec<Resume>,
}

/// One featured project entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturedProject<'a> {
    pub title: &'a str,
    pub tech_preview: &'a [String],
}

/// One skill-group bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillBar<'a> {
    pub title: &'a str,
    pub skill_count: usize,
    pub percent: u8,
}

/// Reads every collection concurrently.
///
/// # Errors
/// Returns the first repository error; partial results are discarded.
pub async fn fetch_snapshot<R: RecordRepository + ?Sized>(
    repo: &R,
) -> RepoResult<DashboardSnapshot> {
    let (personal, projects, skill_groups, education, resumes) = futures::try_join!(
        repo.fetch_personal_details(),
        repo.list_projects(),
        repo.list_skill_groups(),
        repo.fetch_education(),
        repo.list_resumes(),
    )?;

    Ok(DashboardSnapshot {
        personal: personal.unwrap_or_default(),
        projects,
        skill_groups,
        academic: education.map(|education| education.academic).unwrap_or_default(),
        resumes,
    })
}

/// Like [`fetch_snapshot`], but a failure is logged and yields the empty
/// snapshot so the overview still renders.
pub async fn load_dashboard<R: RecordRepository + ?Sized>(repo: &R) -> DashboardSnapshot {
    let started_at = Instant::now();
    match fetch_snapshot(repo).await {
        Ok(snapshot) => {
            info!(
                "event=dashboard_fetch module=dashboard status=ok duration_ms={} projects={} skill_groups={} resumes={}",
                started_at.elapsed().as_millis(),
                snapshot.projects.len(),
                snapshot.skill_groups.len(),
                snapshot.resumes.len()
            );
            snapshot
        }
        Err(err) => {
            warn!(
                "event=dashboard_fetch module=dashboard status=error duration_ms={} fallback=default error={}",
                started_at.elapsed().as_millis(),
                err
            );
            DashboardSnapshot::default()
        }
    }
}

impl DashboardSnapshot {
    pub fn display_name(&self) -> &str {
        let name = self.personal.name.trim();
        if name.is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            name
        }
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Sum of skills across every group.
    pub fn total_skills(&self) -> usize {
        self.skill_groups.iter().map(|group| group.skills.len()).sum()
    }

    pub fn academic_count(&self) -> usize {
        self.academic.len()
    }

    pub fn resume_count(&self) -> usize {
        self.resumes.len()
    }

    /// First projects in repository order, each with a short tech preview.
    pub fn featured_projects(&self) -> Vec<FeaturedProject<'_>> {
        self.projects
            .iter()
            .take(FEATURED_PROJECT_COUNT)
            .map(|project| FeaturedProject {
                title: &project.title,
                tech_preview: &project.tech_stack
                    [..project.tech_stack.len().min(FEATURED_TECH_COUNT)],
            })
            .collect()
    }

    /// First resume flagged active.
    pub fn active_resume(&self) -> Option<&Resume> {
        self.resumes.iter().find(|resume| resume.is_active)
    }

    pub fn skill_bars(&self) -> Vec<SkillBar<'_>> {
        self.skill_groups
            .iter()
            .map(|group| SkillBar {
                title: &group.title,
                skill_count: group.skills.len(),
                percent: skill_bar_percent(group.skills.len()),
            })
            .collect()
    }
}

/// Bar width for a group: ten points per skill, capped at 100.
pub fn skill_bar_percent(skill_count: usize) -> u8 {
    let percent = skill_count.saturating_mul(SKILL_BAR_POINTS_PER_SKILL).min(100);
    u8::try_from(percent).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::skill_bar_percent;

    #[test]
    fn skill_bar_scales_and_caps() {
        assert_eq!(skill_bar_percent(0), 0);
        assert_eq!(skill_bar_percent(4), 40);
        assert_eq!(skill_bar_percent(10), 100);
        assert_eq!(skill_bar_percent(27), 100);
        assert_eq!(skill_bar_percent(usize::MAX), 100);
    }
}
