//! The install command

use colored::Colorize;
use kit_core::InstallOptions;
use kit_meta::InstallMethod;

use super::{print_warnings, resolve_package, with_build_dir_retry};
use crate::context::Context;
use crate::error::{CliError, Result};
use crate::interactive;

/// Run the install command
///
/// An installed package is reinstalled in place, which is also how its
/// install method is switched.
pub fn run_install(
    ctx: &Context,
    name: Option<&str>,
    force_refresh: bool,
    method: Option<InstallMethod>,
    yes: bool,
) -> Result<()> {
    let registry = ctx.registry()?;
    let manifest = resolve_package(&registry, name, force_refresh)?;
    let method = method.unwrap_or(ctx.config.options.install_method);
    let existing = ctx.store().get(&manifest.name)?;

    let prompt = match &existing {
        Some(record) => format!(
            "{} is installed ({}, {}). Reinstall {} ({method})?",
            manifest.name,
            record.actual_version(),
            record.method(),
            manifest.display_version()
        ),
        None => format!("Install {} {} ({method})?", manifest.name, manifest.display_version()),
    };
    if !interactive::confirm(&prompt, true, yes)? {
        return Err(CliError::user("Install cancelled."));
    }

    let reconciler = ctx.reconciler();
    let report = with_build_dir_retry(yes, "Install cancelled.", |build_dir_policy| {
        let options = InstallOptions {
            method,
            build_dir_policy,
        };
        if existing.is_some() {
            reconciler.reinstall(&manifest, options)
        } else {
            reconciler.install(&manifest, options)
        }
    })?;

    print_warnings(&report.warnings);
    let verb = if existing.is_some() { "Reinstalled" } else { "Installed" };
    println!(
        "{} {verb} {} {}",
        "OK".green().bold(),
        manifest.name.cyan(),
        report.record.actual_version()
    );
    for path in &report.placed {
        println!("  {} {}", "+".green(), path.display());
    }
    Ok(())
}
