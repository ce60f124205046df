//! The list command

use std::collections::BTreeMap;

use colored::Colorize;
use kit_meta::{InstalledRecord, PackageManifest};

use crate::context::Context;
use crate::error::Result;

/// Run the list command
pub fn run_list(ctx: &Context, force_refresh: bool) -> Result<()> {
    let mut packages = ctx.registry()?.load(force_refresh)?;
    let installed: BTreeMap<String, InstalledRecord> = ctx
        .store()
        .list()?
        .into_iter()
        .map(|r| (r.name().to_string(), r))
        .collect();

    packages.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));

    println!("{}", "Available Packages".bold());

    let mut current_category: Option<Option<&str>> = None;
    for manifest in &packages {
        let category = manifest.category.as_deref().filter(|c| !c.is_empty());
        if current_category != Some(category) {
            current_category = Some(category);
            println!();
            println!("{}:", category.unwrap_or("uncategorized").cyan().bold());
        }

        let status = status_label(manifest, installed.get(&manifest.name));
        println!(
            "  {:<20} {:<12} {}",
            manifest.name.green(),
            manifest.display_version(),
            status
        );
    }

    println!();
    println!(
        "{} {} packages, {} installed. Use {} to add one.",
        "Total:".dimmed(),
        packages.len(),
        installed.len(),
        "kit install <name>".cyan()
    );
    Ok(())
}

/// Installed marker for one registry entry.
fn status_label(manifest: &PackageManifest, record: Option<&InstalledRecord>) -> String {
    let Some(record) = record else {
        return String::new();
    };
    let installed = record.actual_version();
    if record.method().is_latest() || installed == manifest.display_version() {
        format!("installed ({installed})")
    } else {
        format!("installed ({installed}, registry has {})", manifest.display_version())
    }
}
