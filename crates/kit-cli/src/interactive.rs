//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based selection and confirmation.

use dialoguer::{Confirm, Input, Select};
use kit_meta::{InstalledRecord, PackageManifest};

use crate::error::{CliError, Result};

/// Menu line for a registry package.
pub fn package_label(manifest: &PackageManifest) -> String {
    let mut label = format!("{} ({})", manifest.name, manifest.display_version());
    if !manifest.description.is_empty() {
        label.push_str(" - ");
        label.push_str(&manifest.description);
    }
    label
}

/// Choose one package from the registry list.
pub fn select_package(packages: Vec<PackageManifest>) -> Result<PackageManifest> {
    if packages.is_empty() {
        return Err(CliError::user("The registry has no packages."));
    }
    let items: Vec<String> = packages.iter().map(package_label).collect();
    let index = Select::new()
        .with_prompt("Select a package")
        .items(&items)
        .default(0)
        .interact()?;

    packages
        .into_iter()
        .nth(index)
        .ok_or_else(|| CliError::user("No package selected."))
}

/// Choose one installed package by name.
pub fn select_installed(records: &[InstalledRecord]) -> Result<String> {
    if records.is_empty() {
        return Err(CliError::user("No packages are installed."));
    }
    let items: Vec<String> = records
        .iter()
        .map(|r| format!("{} ({})", r.name(), r.actual_version()))
        .collect();
    let index = Select::new()
        .with_prompt("Select an installed package")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(records[index].name().to_string())
}

/// Ask a yes/no question; `assume_yes` skips the prompt.
pub fn confirm(prompt: &str, default: bool, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Ask for a text value with a default.
pub fn input(prompt: &str, default: &str) -> Result<String> {
    Ok(Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?)
}
