//! Command implementations for kit-cli

pub mod completions;
pub mod init_config;
pub mod install;
pub mod list;
pub mod preview;
pub mod remove;
pub mod shell;
pub mod update;

pub use completions::run_completions;
pub use init_config::run_init_config;
pub use install::run_install;
pub use list::run_list;
pub use preview::run_preview;
pub use remove::run_remove;
pub use shell::run_add_executables_path;
pub use update::run_update;

use colored::Colorize;
use kit_core::{BuildDirPolicy, Error as CoreError};
use kit_meta::PackageManifest;
use kit_registry::Registry;

use crate::error::{CliError, Result};
use crate::interactive;

/// The named package, or one chosen from the full registry list.
fn resolve_package(
    registry: &Registry,
    name: Option<&str>,
    force_refresh: bool,
) -> Result<PackageManifest> {
    match name {
        Some(name) => Ok(registry.find(name, force_refresh)?),
        None => interactive::select_package(registry.load(force_refresh)?),
    }
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

/// Run `operation`, asking once to replace a leftover build directory.
fn with_build_dir_retry<T>(
    yes: bool,
    cancelled: &str,
    mut operation: impl FnMut(BuildDirPolicy) -> kit_core::Result<T>,
) -> Result<T> {
    match operation(BuildDirPolicy::Refuse) {
        Err(CoreError::BuildDirExists { path }) => {
            let prompt = format!("Build directory {} already exists. Remove it?", path.display());
            if !interactive::confirm(&prompt, false, yes)? {
                return Err(CliError::user(cancelled));
            }
            Ok(operation(BuildDirPolicy::Replace)?)
        }
        other => Ok(other?),
    }
}
