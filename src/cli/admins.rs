//! Admins subcommand implementation.
//!
//! Handles `rollbook admins` for managing admin accounts. The first account
//! can be created without logging in; everything else needs an admin login.

use super::{prompt_new_password, Context};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::registry::AdminStore;
use clap::{Parser, Subcommand};

/// Manage admin accounts.
#[derive(Parser, Debug)]
pub struct AdminsCommand {
    #[command(subcommand)]
    pub action: AdminsAction,
}

/// Admin management actions.
#[derive(Subcommand, Debug)]
pub enum AdminsAction {
    /// List admin usernames
    List,

    /// Create an admin account
    Add {
        /// Username for the new admin
        name: String,

        /// Password for the new admin (prompted if omitted)
        #[arg(long, env = "ROLLBOOK_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },

    /// Remove an admin account
    Remove {
        /// Username to remove
        name: String,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Change your own password
    Passwd {
        /// New password (prompted if omitted)
        #[arg(long, env = "ROLLBOOK_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },
}

impl AdminsCommand {
    /// Execute the admins command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        let mut admins = AdminStore::load(&ctx.paths)?;

        match &self.action {
            AdminsAction::List => {
                ctx.login()?;
                for name in admins.usernames() {
                    println!("{}", name);
                }
            }
            AdminsAction::Add { name, new_password } => {
                if admins.is_empty() {
                    if !ctx.quiet {
                        output::print_info("No admins yet; creating the first account.");
                    }
                } else {
                    ctx.login()?;
                }

                let password = match new_password {
                    Some(password) => password.clone(),
                    None => prompt_new_password()?,
                };
                admins.add(name, &password)?;
                if !ctx.quiet {
                    output::print_success(&format!("Admin '{}' added", name.trim()));
                }
            }
            AdminsAction::Remove { name, yes } => {
                let current = ctx.login()?;
                // Reload: login may have upgraded a legacy entry on disk.
                admins = AdminStore::load(&ctx.paths)?;

                if !admins.contains(name) {
                    return Err(CliError::Other(format!("admin '{}' not found", name)));
                }

                if !yes {
                    println!("Remove admin '{}'? [y/N] ", name);
                    let mut input = String::new();
                    std::io::stdin().read_line(&mut input)?;
                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Cancelled.");
                        return Ok(());
                    }
                }

                admins.remove(name, &current)?;
                if !ctx.quiet {
                    output::print_success(&format!("Admin '{}' removed", name));
                }
            }
            AdminsAction::Passwd { new_password } => {
                let current = ctx.login()?;
                admins = AdminStore::load(&ctx.paths)?;

                let password = match new_password {
                    Some(password) => password.clone(),
                    None => prompt_new_password()?,
                };
                admins.change_password(&current, &password)?;
                if !ctx.quiet {
                    output::print_success("Password updated");
                }
            }
        }

        Ok(())
    }
}
