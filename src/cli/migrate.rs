//! Migrate subcommand implementation.

use super::Context;
use crate::error::CliResult;
use crate::output;
use crate::storage::XlsxTable;
use clap::Parser;

/// Add the Session column to an older attendance table.
///
/// Rows of a table written before sessions existed are assigned to the
/// morning session. Tables that already carry the column are left alone.
#[derive(Parser, Debug)]
pub struct MigrateCommand {
    /// Only report whether the table needs migrating
    #[arg(long)]
    pub check: bool,
}

impl MigrateCommand {
    /// Execute the migrate command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        ctx.login()?;

        let location = ctx.settings.attendance_file(&ctx.paths);
        let table = XlsxTable::new(location.clone());

        if self.check {
            if table.is_legacy()? {
                println!("{} needs migrating", location.display());
            } else {
                println!("{} is up to date", location.display());
            }
            return Ok(());
        }

        if table.migrate()? {
            if !ctx.quiet {
                output::print_success(&format!(
                    "Added Session column to {}",
                    location.display()
                ));
            }
        } else if !ctx.quiet {
            output::print_info("Attendance table is already up to date.");
        }

        Ok(())
    }
}
