//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `rollbook submit` - Mark today's session and save it
//! - `rollbook report` - View or export recorded attendance
//! - `rollbook students list|register|add|remove` - Manage the student registry
//! - `rollbook admins list|add|remove|passwd` - Manage admin accounts
//! - `rollbook email show|set|recipients|test|prune` - Configure notifications
//! - `rollbook settings show|...` - Table location and session schedule
//! - `rollbook migrate` - Upgrade a table written without the Session column

mod admins;
mod email;
mod migrate;
mod report;
mod settings;
mod students;
mod submit;

pub use admins::AdminsCommand;
pub use email::EmailCommand;
pub use migrate::MigrateCommand;
pub use report::ReportCommand;
pub use settings::SettingsCommand;
pub use students::StudentsCommand;
pub use submit::SubmitCommand;

use crate::config::{AppSettings, Paths};
use crate::error::{CliError, CliResult};
use crate::registry::AdminStore;
use crate::storage::AttendanceStore;
use clap::{Parser, Subcommand};
use console::Term;
use std::path::PathBuf;
use tracing::debug;

/// Rollbook - an attendance book backed by a spreadsheet.
///
/// Administrators mark students present or absent for each day and session.
/// Results are merged into an Excel workbook that can be opened in any
/// spreadsheet application, and morning absentees can be notified by email.
#[derive(Parser, Debug)]
#[command(name = "rollbook")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Attendance and daily event book", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Keep configuration and data under this directory instead of the
    /// platform defaults
    #[arg(long, global = true, value_name = "DIR", env = "ROLLBOOK_HOME")]
    pub config_dir: Option<PathBuf>,

    /// Admin username to log in as (prompted if omitted)
    #[arg(short, long, global = true, env = "ROLLBOOK_USER")]
    pub user: Option<String>,

    /// Admin password (prompted if omitted)
    #[arg(long, global = true, env = "ROLLBOOK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mark attendance for a session and save it
    #[command(alias = "s")]
    Submit(SubmitCommand),

    /// View or export recorded attendance
    #[command(alias = "r")]
    Report(ReportCommand),

    /// Manage registered students
    Students(StudentsCommand),

    /// Manage admin accounts
    Admins(AdminsCommand),

    /// Configure absence notifications
    Email(EmailCommand),

    /// Show or change application settings
    Settings(SettingsCommand),

    /// Add the Session column to an older attendance table
    Migrate(MigrateCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for spreadsheets
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// State shared by every subcommand.
pub struct Context {
    pub paths: Paths,
    pub settings: AppSettings,
    pub verbose: bool,
    pub quiet: bool,
    user: Option<String>,
    password: Option<String>,
}

impl Context {
    /// Resolve paths and load settings for a parsed command line.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let paths = match &cli.config_dir {
            Some(dir) => Paths::rooted(dir)?,
            None => Paths::discover()?,
        };
        let settings = AppSettings::load(&paths)?;
        debug!(config_dir = %paths.config_dir.display(), "loaded settings");

        Ok(Self {
            paths,
            settings,
            verbose: cli.verbose,
            quiet: cli.quiet,
            user: cli.user.clone(),
            password: cli.password.clone(),
        })
    }

    /// Open the attendance store at the configured location.
    pub fn store(&self) -> AttendanceStore {
        AttendanceStore::open(self.settings.attendance_file(&self.paths))
    }

    /// Authenticate an admin, prompting for anything not given on the
    /// command line. Returns the username.
    pub fn login(&self) -> CliResult<String> {
        let mut admins = AdminStore::load(&self.paths)?;
        if admins.is_empty() {
            return Err(CliError::Other(
                "no admin accounts exist yet; create one with `rollbook admins add <NAME>`"
                    .to_string(),
            ));
        }

        let user = match &self.user {
            Some(user) => user.clone(),
            None => prompt_line("Username: ")?,
        };
        let password = match &self.password {
            Some(password) => password.clone(),
            None => prompt_secret("Password: ")?,
        };

        admins.authenticate(&user, &password)?;
        debug!(%user, "admin logged in");

        Ok(user)
    }
}

/// Ask for a line of input on the terminal.
pub(crate) fn prompt_line(label: &str) -> CliResult<String> {
    let term = Term::stderr();
    term.write_str(label)?;
    Ok(term.read_line()?.trim().to_string())
}

/// Ask for a line of input without echoing it.
pub(crate) fn prompt_secret(label: &str) -> CliResult<String> {
    let term = Term::stderr();
    term.write_str(label)?;
    Ok(term.read_secure_line()?)
}

/// Ask for a new password twice.
pub(crate) fn prompt_new_password() -> CliResult<String> {
    let first = prompt_secret("New password: ")?;
    let second = prompt_secret("Repeat password: ")?;
    if first != second {
        return Err(CliError::Other("passwords do not match".to_string()));
    }
    Ok(first)
}

/// Execute the parsed command line.
pub fn run(cli: Cli) -> CliResult<()> {
    let ctx = Context::from_cli(&cli)?;

    match &cli.command {
        Commands::Submit(cmd) => cmd.execute(&ctx),
        Commands::Report(cmd) => cmd.execute(&ctx),
        Commands::Students(cmd) => cmd.execute(&ctx),
        Commands::Admins(cmd) => cmd.execute(&ctx),
        Commands::Email(cmd) => cmd.execute(&ctx),
        Commands::Settings(cmd) => cmd.execute(&ctx),
        Commands::Migrate(cmd) => cmd.execute(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit_with_globals() {
        let cli = Cli::try_parse_from([
            "rollbook",
            "submit",
            "--date",
            "2024-01-01",
            "--absent",
            "Bob",
            "--user",
            "head",
        ])
        .unwrap();

        assert_eq!(cli.user.as_deref(), Some("head"));
        assert!(matches!(cli.command, Commands::Submit(_)));
    }

    #[test]
    fn test_login_requires_an_admin() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "rollbook",
            "report",
            "--config-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let ctx = Context::from_cli(&cli).unwrap();

        assert!(matches!(ctx.login(), Err(CliError::Other(_))));
    }

    #[test]
    fn test_login_with_flags() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "rollbook", "report", "--config-dir", root, "--user", "head", "--password", "pw",
        ])
        .unwrap();
        let ctx = Context::from_cli(&cli).unwrap();
        AdminStore::load(&ctx.paths).unwrap().add("head", "pw").unwrap();

        assert_eq!(ctx.login().unwrap(), "head");

        let wrong = Context {
            password: Some("nope".to_string()),
            ..Context::from_cli(&cli).unwrap()
        };
        assert!(matches!(wrong.login(), Err(CliError::Admin(_))));
    }
}
