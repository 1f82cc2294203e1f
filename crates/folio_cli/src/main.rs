//! Folio admin console.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Open the record store and dispatch exactly one command against it.
//!
//! # Invariants
//! - Logging starts only when a log directory is configured.
//! - Every content edit goes through a sync controller, never a raw write.

mod commands;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use folio_core::db::open_db;
use folio_core::{default_log_level, init_logging, SqliteStore};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Admin console for portfolio content")]
#[command(version)]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "FOLIO_DB", default_value = "folio.sqlite3", global = true)]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = "FOLIO_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Directory for rolling log files. Logging stays off when unset.
    #[arg(long, env = "FOLIO_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check core wiring
    Ping,
    /// Show the portfolio overview
    Dashboard,
    /// Personal details
    Personal {
        #[command(subcommand)]
        action: PersonalAction,
    },
    /// Core objective and academic history
    Education {
        #[command(subcommand)]
        action: EducationAction,
    },
    /// Portfolio projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Skill groups
    Skills {
        #[command(subcommand)]
        action: SkillAction,
    },
    /// Uploaded resumes
    Resumes {
        #[command(subcommand)]
        action: ResumeAction,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Dashboard => "dashboard",
            Self::Personal { .. } => "personal",
            Self::Education { .. } => "education",
            Self::Projects { .. } => "projects",
            Self::Skills { .. } => "skills",
            Self::Resumes { .. } => "resumes",
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum PersonalAction {
    Show,
    /// Edit personal details; omitted fields keep their saved value
    Set(PersonalArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct PersonalArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub github: Option<String>,
    #[arg(long)]
    pub linkedin: Option<String>,
    /// Image file embedded as a data URI.
    #[arg(long)]
    pub avatar: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum EducationAction {
    Show,
    /// Replace the core objective
    Objective { text: String },
    /// Append an academic record
    Add(AcademicArgs),
    /// Edit one academic record; omitted fields are unchanged
    Update {
        id: String,
        #[command(flatten)]
        fields: AcademicArgs,
    },
    /// Remove one academic record
    Remove { id: String },
}

#[derive(Args, Debug, Default)]
pub(crate) struct AcademicArgs {
    #[arg(long)]
    pub degree: Option<String>,
    #[arg(long)]
    pub institution: Option<String>,
    #[arg(long)]
    pub duration: Option<String>,
    /// Result as CGPA or percentage.
    #[arg(long)]
    pub cgpa: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ProjectAction {
    List,
    /// Create a project, or edit one with --id
    Save(ProjectArgs),
    /// Delete a project; requires --yes
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ProjectArgs {
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Thumbnail file embedded as a data URI.
    #[arg(long, conflicts_with = "image_url")]
    pub image: Option<PathBuf>,
    #[arg(long)]
    pub image_url: Option<String>,
    /// Comma-delimited tags.
    #[arg(long)]
    pub tags: Option<String>,
    /// Comma-delimited tech stack.
    #[arg(long)]
    pub tech: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub code_url: Option<String>,
    #[arg(long)]
    pub demo_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SkillAction {
    List,
    Add { title: String, skills: Vec<String> },
}

#[derive(Subcommand, Debug)]
pub(crate) enum ResumeAction {
    List,
    /// Upload a PDF resume
    Add {
        file: PathBuf,
        #[arg(long)]
        active: bool,
    },
    /// Make one resume the only active one
    Activate { id: String },
    /// Write a stored resume back to a PDF file
    Export { id: String, out: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = std::path::absolute(log_dir)
            .with_context(|| format!("Failed to resolve log directory '{}'", log_dir.display()))?;
        init_logging(level, &log_dir.to_string_lossy()).map_err(|err| anyhow!(err))?;
    }

    let command_name = cli.command.name();
    info!("event=cli_command module=cli status=start command={command_name}");

    if let Command::Ping = cli.command {
        println!("folio_core ping={}", folio_core::ping());
        println!("folio_core version={}", folio_core::core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("Failed to open database '{}'", cli.db.display()))?;
    let store = SqliteStore::try_new(&conn)?;

    let result = match cli.command {
        Command::Ping => Ok(()),
        Command::Dashboard => commands::dashboard(&store),
        Command::Personal { action } => commands::personal(&store, action),
        Command::Education { action } => commands::education(&store, action),
        Command::Projects { action } => commands::projects(&store, action),
        Command::Skills { action } => commands::skills(&store, action),
        Command::Resumes { action } => commands::resumes(&store, action),
    };

    let status = if result.is_ok() { "ok" } else { "error" };
    info!("event=cli_command module=cli status={status} command={command_name}");
    result
}
