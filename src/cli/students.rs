//! Students subcommand implementation.
//!
//! Handles `rollbook students` for managing the student registry.

use super::Context;
use crate::error::CliResult;
use crate::output;
use crate::registry::StudentRegistry;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Manage registered students.
#[derive(Parser, Debug)]
pub struct StudentsCommand {
    #[command(subcommand)]
    pub action: StudentsAction,
}

/// Student registry actions.
#[derive(Subcommand, Debug)]
pub enum StudentsAction {
    /// List registered students
    List,

    /// Replace the registry with names read one per line
    Register {
        /// File to read names from (stdin if omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Register one more student
    Add {
        /// Student name
        name: String,
    },

    /// Remove a student (recorded attendance is kept)
    Remove {
        /// Student name
        name: String,
    },
}

impl StudentsCommand {
    /// Execute the students command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        ctx.login()?;
        let mut registry = StudentRegistry::load(&ctx.paths)?;

        match &self.action {
            StudentsAction::List => {
                if registry.is_empty() {
                    if !ctx.quiet {
                        println!("No students registered.");
                    }
                    return Ok(());
                }
                for (i, name) in registry.list().iter().enumerate() {
                    println!("{:>4}. {}", i + 1, name);
                }
            }
            StudentsAction::Register { file } => {
                let text = match file {
                    Some(path) => fs::read_to_string(path)?,
                    None => {
                        let mut text = String::new();
                        io::stdin().read_to_string(&mut text)?;
                        text
                    }
                };
                let count = registry.register_lines(&text);
                registry.save()?;
                if !ctx.quiet {
                    output::print_success(&format!("{} students registered", count));
                }
            }
            StudentsAction::Add { name } => {
                registry.add(name)?;
                registry.save()?;
                if !ctx.quiet {
                    output::print_success(&format!("Student '{}' registered", name.trim()));
                }
            }
            StudentsAction::Remove { name } => {
                registry.remove(name)?;
                registry.save()?;
                if !ctx.quiet {
                    output::print_success(&format!("Student '{}' removed", name.trim()));
                }
            }
        }

        Ok(())
    }
}
