//! The preview command: show a manifest and its install state without
//! touching the filesystem

use colored::Colorize;
use kit_meta::{InstalledRecord, PackageManifest};

use super::resolve_package;
use crate::context::Context;
use crate::error::Result;

/// Run the preview command
pub fn run_preview(ctx: &Context, name: Option<&str>, force_refresh: bool) -> Result<()> {
    let registry = ctx.registry()?;
    let manifest = resolve_package(&registry, name, force_refresh)?;
    let record = ctx.store().get(&manifest.name)?;
    print!("{}", render(&manifest, record.as_ref()));
    Ok(())
}

fn render(manifest: &PackageManifest, record: Option<&InstalledRecord>) -> String {
    let mut out = String::new();
    let mut field = |label: &str, value: &str| {
        if !value.is_empty() {
            out.push_str(&format!("  {:<13} {}\n", format!("{label}:").dimmed(), value));
        }
    };

    field("Version", manifest.version.as_deref().unwrap_or_default());
    field("Commit", manifest.commit.as_deref().unwrap_or_default());
    field("Category", manifest.category.as_deref().unwrap_or_default());
    field("Description", &manifest.description);
    field("Maintainer", &manifest.maintainer);
    field("License", &manifest.license);
    field("Homepage", &manifest.homepage);
    let tags: Vec<&str> = manifest.tags.iter().map(String::as_str).collect();
    field("Tags", &tags.join(", "));
    let updated = manifest
        .updated_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    field("Updated", &updated);

    let mut text = format!("{}\n{out}", manifest.name.bold());

    let install = &manifest.install;
    section(&mut text, "Environment", install.environment.iter().map(|(k, v)| format!("{k}={v}")));
    section(&mut text, "Steps", install.steps.iter().cloned());
    section(&mut text, "Binaries", install.binaries.iter().cloned());
    section(&mut text, "Configs", install.configs.iter().cloned());
    section(&mut text, "Man pages", install.man.iter().cloned());
    section(
        &mut text,
        "Additional configs",
        install.additional_config.iter().map(|c| c.filename.clone()),
    );
    section(
        &mut text,
        "Post-install scripts",
        manifest.post_install.scripts.iter().map(|s| s.filename.clone()),
    );
    section(&mut text, "Installed", installed_lines(record).into_iter());
    text
}

fn installed_lines(record: Option<&InstalledRecord>) -> Vec<String> {
    let Some(record) = record else {
        return vec!["Not installed".to_string()];
    };
    let installation = &record.installation;
    let identifier = if installation.method.is_latest() {
        "Commit:"
    } else {
        "Version:"
    };
    vec![
        format!("{:<13} {}", "Method:", installation.method),
        format!("{identifier:<13} {}", installation.actual_version),
        format!(
            "Installed at: {} by {}",
            installation.installed_at.format("%Y-%m-%d %H:%M"),
            installation.installed_by
        ),
    ]
}

fn section(out: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    let lines: Vec<String> = lines.collect();
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("\n{}:\n", title.cyan().bold()));
    for line in lines {
        out.push_str(&format!("  {line}\n"));
    }
}
