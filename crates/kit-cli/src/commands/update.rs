//! The update command

use std::cmp::Ordering;

use colored::Colorize;
use kit_core::{Error as CoreError, PackageState, UpdateCheck, UpdateOutcome};

use super::{print_warnings, with_build_dir_retry};
use crate::context::Context;
use crate::error::{CliError, Result};
use crate::interactive;

/// Run the update command
pub fn run_update(
    ctx: &Context,
    name: Option<&str>,
    force_refresh: bool,
    yes: bool,
) -> Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => interactive::select_installed(&ctx.store().list()?)?,
    };

    let registry = ctx.registry()?;
    let manifest = registry.find(&name, force_refresh)?;
    let reconciler = ctx.reconciler();

    let (record, check) = match reconciler.state(&manifest)? {
        PackageState::Absent => {
            return Err(CoreError::NotInstalled { name }.into());
        }
        PackageState::Installed(record) => {
            println!(
                "{} {} is up to date ({})",
                "=".blue(),
                name.cyan(),
                record.actual_version()
            );
            return Ok(());
        }
        PackageState::UpdateAvailable { record, check, .. } => (record, check),
    };

    let prompt = format!("Update {name} {}?", describe(&check));
    if !interactive::confirm(&prompt, true, yes)? {
        return Err(CliError::user("Update cancelled."));
    }

    let outcome = with_build_dir_retry(yes, "Update cancelled.", |build_dir_policy| {
        reconciler.apply_update(&record, &manifest, check.clone(), build_dir_policy)
    })?;

    match outcome {
        UpdateOutcome::UpToDate(check) => {
            println!(
                "{} {} is up to date ({})",
                "=".blue(),
                name.cyan(),
                check.installed
            );
        }
        UpdateOutcome::Updated { check, report } => {
            print_warnings(&report.warnings);
            println!(
                "{} Updated {} {}",
                "OK".green().bold(),
                name.cyan(),
                describe(&check)
            );
        }
    }
    Ok(())
}

/// `from 1.0 to 1.1`, noting a downgrade when semver says so.
fn describe(check: &UpdateCheck) -> String {
    let mut text = format!("from {} to {}", check.installed, check.available);
    if check.direction() == Some(Ordering::Less) {
        text.push_str(" (older than installed)");
    }
    text
}
