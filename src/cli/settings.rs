//! Settings subcommand implementation.
//!
//! Handles `rollbook settings` for the table location and session schedule.

use super::Context;
use crate::config::{AppSettings, SessionSlot};
use crate::error::CliResult;
use crate::output;
use crate::types::Session;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Show or change application settings.
#[derive(Parser, Debug)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub action: SettingsAction,
}

/// Settings actions.
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Show file locations and current settings
    Show,

    /// Store the attendance table at a different path
    SetFile {
        /// New table location
        path: PathBuf,
    },

    /// Go back to the default table location
    ResetFile,

    /// Add or move a session in the daily schedule
    Schedule {
        /// Session name
        name: Session,

        /// Start time (HH:MM)
        starts_at: String,
    },

    /// Remove a session from the daily schedule
    Unschedule {
        /// Session name
        name: Session,
    },

    /// Only send absence notices for submissions dated today
    NotifyOnlyToday {
        /// true or false
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

impl SettingsCommand {
    /// Execute the settings command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        if let SettingsAction::Show = self.action {
            return self.show(ctx);
        }

        ctx.login()?;
        let mut settings = ctx.settings.clone();
        let message = apply(&mut settings, &self.action)?;
        settings.save(&ctx.paths)?;

        if !ctx.quiet {
            output::print_success(&message);
        }

        Ok(())
    }

    fn show(&self, ctx: &Context) -> CliResult<()> {
        println!("Config dir:        {}", ctx.paths.config_dir.display());
        println!("Data dir:          {}", ctx.paths.data_dir.display());
        println!(
            "Attendance table:  {}",
            ctx.settings.attendance_file(&ctx.paths).display()
        );
        println!("Notify only today: {}", ctx.settings.notify_only_today);
        println!();

        if ctx.settings.sessions.is_empty() {
            println!("No sessions scheduled.");
        } else {
            println!("Sessions:");
            let mut slots = ctx.settings.sessions.clone();
            slots.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
            for slot in slots {
                println!("  {:<12} {}", slot.name.as_str(), slot.starts_at);
            }
        }

        if ctx.verbose {
            println!();
            output::print_json(&ctx.settings)?;
        }

        Ok(())
    }
}

/// Apply a change to `settings`, returning a confirmation message.
fn apply(settings: &mut AppSettings, action: &SettingsAction) -> CliResult<String> {
    let message = match action {
        SettingsAction::Show => String::new(),
        SettingsAction::SetFile { path } => {
            settings.attendance_file = Some(path.clone());
            format!("Attendance table set to {}", path.display())
        }
        SettingsAction::ResetFile => {
            settings.attendance_file = None;
            "Attendance table reset to the default location".to_string()
        }
        SettingsAction::Schedule { name, starts_at } => {
            let slot = SessionSlot::new(name.clone(), starts_at.trim());
            slot.start_time()?;
            match settings.sessions.iter_mut().find(|s| &s.name == name) {
                Some(existing) => *existing = slot,
                None => settings.sessions.push(slot),
            }
            format!("Session '{}' starts at {}", name, starts_at.trim())
        }
        SettingsAction::Unschedule { name } => {
            settings.sessions.retain(|s| &s.name != name);
            format!("Session '{}' removed from the schedule", name)
        }
        SettingsAction::NotifyOnlyToday { enabled } => {
            settings.notify_only_today = *enabled;
            format!("Notify only today: {}", enabled)
        }
    };

    Ok(message)
}
