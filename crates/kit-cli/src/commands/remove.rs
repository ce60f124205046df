//! The remove command

use colored::Colorize;

use super::print_warnings;
use crate::context::Context;
use crate::error::{CliError, Result};
use crate::interactive;

/// Run the remove command
pub fn run_remove(ctx: &Context, name: Option<&str>, yes: bool) -> Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => interactive::select_installed(&ctx.store().list()?)?,
    };

    if !interactive::confirm(&format!("Remove {name}?"), false, yes)? {
        return Err(CliError::user("Remove cancelled."));
    }

    let report = ctx.reconciler().remove(&name)?;

    print_warnings(&report.warnings);
    for path in &report.removed {
        println!("  {} {}", "-".red(), path.display());
    }
    println!("{} Removed {}", "OK".green().bold(), name.cyan());
    Ok(())
}
