//! Placement and removal of package files
//!
//! Every operation here is per file and best-effort: a failure becomes a
//! warning and the remaining files are still processed. The one exception is
//! a declared binary the build did not produce, which is fatal.

use std::path::{Component, Path, PathBuf};

use kit_fs::io;
use kit_meta::{AdditionalConfig, Script, man_section};

use crate::download::Downloader;
use crate::store::RECORD_FILE;
use crate::{Error, Result};

/// What a placement or removal pass did, and what it could not do.
#[derive(Debug, Default)]
pub(crate) struct ArtifactLog {
    package: String,
    pub placed: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl ArtifactLog {
    pub fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            ..Default::default()
        }
    }

    pub fn warn(&mut self, message: String) {
        tracing::warn!(package = %self.package, "{message}");
        self.warnings.push(message);
    }
}

fn basename(declared: &str) -> Option<&str> {
    Path::new(declared).file_name().and_then(|n| n.to_str())
}

/// Relative path confined below its base directory.
fn confined(relative: &str) -> Option<&Path> {
    let path = Path::new(relative);
    let ok = !relative.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    ok.then_some(path)
}

/// Whether `relative` would land on the installed record in the config directory.
fn is_record_file(relative: &Path) -> bool {
    let mut parts = relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir));
    matches!(
        (parts.next(), parts.next()),
        (Some(Component::Normal(name)), None) if name == RECORD_FILE
    )
}

/// Fail unless every declared binary exists in the build output.
pub(crate) fn check_binaries(package: &str, build_dir: &Path, binaries: &[String]) -> Result<()> {
    for declared in binaries {
        let src = build_dir.join(declared);
        if !src.is_file() {
            return Err(Error::MissingBinary {
                package: package.to_string(),
                path: src,
            });
        }
    }
    Ok(())
}

/// Copy binaries into `bin_dir` under their basenames, mode 0o755.
pub(crate) fn install_binaries(
    build_dir: &Path,
    bin_dir: &Path,
    binaries: &[String],
    log: &mut ArtifactLog,
) {
    for declared in binaries {
        let Some(name) = basename(declared) else {
            log.warn(format!("Binary path '{declared}' has no file name"));
            continue;
        };
        let src = build_dir.join(declared);
        let dst = bin_dir.join(name);

        let result = io::copy_file(&src, &dst).and_then(|_| io::set_executable(&dst));
        match result {
            Ok(()) => log.placed.push(dst),
            Err(e) => log.warn(format!("Failed to install binary {name}: {e}")),
        }
    }
}

/// Copy config files into the package config directory.
pub(crate) fn install_configs(
    build_dir: &Path,
    config_dir: &Path,
    configs: &[String],
    log: &mut ArtifactLog,
) {
    for declared in configs {
        let Some(name) = basename(declared) else {
            log.warn(format!("Config path '{declared}' has no file name"));
            continue;
        };
        if is_record_file(Path::new(name)) {
            log.warn(format!("Config '{declared}' would overwrite {RECORD_FILE}, skipping"));
            continue;
        }
        let src = build_dir.join(declared);
        if !src.exists() {
            log.warn(format!("Config file not found: {}", src.display()));
            continue;
        }

        let dst = config_dir.join(name);
        match io::copy_file(&src, &dst) {
            Ok(_) => log.placed.push(dst),
            Err(e) => log.warn(format!("Failed to copy config {name}: {e}")),
        }
    }
}

/// Copy man pages into `<man_root>/<section>/`.
pub(crate) fn install_man_pages(
    build_dir: &Path,
    man_root: &Path,
    pages: &[String],
    log: &mut ArtifactLog,
) {
    for declared in pages {
        let (Some(name), Some(section)) = (basename(declared), man_section(declared)) else {
            log.warn(format!(
                "Cannot determine man section for '{declared}', skipping"
            ));
            continue;
        };
        let src = build_dir.join(declared);
        if !src.exists() {
            log.warn(format!("Man page not found: {}", src.display()));
            continue;
        }

        let section_dir = man_root.join(&section);
        let dst = section_dir.join(name);
        let result = io::ensure_dir(&section_dir).and_then(|_| io::copy_file(&src, &dst));
        match result {
            Ok(_) => log.placed.push(dst),
            Err(e) => log.warn(format!("Failed to install man page {name}: {e}")),
        }
    }
}

/// Write additional config entries below `config_dir`.
///
/// URL content is downloaded; anything else is written verbatim.
pub(crate) fn write_additional_configs(
    config_dir: &Path,
    entries: &[AdditionalConfig],
    downloader: &dyn Downloader,
    log: &mut ArtifactLog,
) {
    for entry in entries {
        let Some(relative) = confined(&entry.filename) else {
            log.warn(format!(
                "Additional config '{}' must be a relative path inside the config directory",
                entry.filename
            ));
            continue;
        };
        if is_record_file(relative) {
            log.warn(format!(
                "Additional config '{}' would overwrite {RECORD_FILE}, skipping",
                entry.filename
            ));
            continue;
        }

        let content = if entry.is_remote() {
            match downloader.download(entry.content.trim()) {
                Ok(content) => content,
                Err(e) => {
                    log.warn(format!(
                        "Failed to download additional config {}: {e}",
                        entry.filename
                    ));
                    continue;
                }
            }
        } else {
            entry.content.clone()
        };

        let dst = config_dir.join(relative);
        match io::write_text(&dst, &content) {
            Ok(()) => log.placed.push(dst),
            Err(e) => log.warn(format!(
                "Failed to write additional config {}: {e}",
                entry.filename
            )),
        }
    }
}

/// Write post-install scripts into the build directory, then move them into
/// `bin_dir` as executables.
pub(crate) fn install_scripts(
    build_dir: &Path,
    bin_dir: &Path,
    scripts: &[Script],
    log: &mut ArtifactLog,
) {
    for script in scripts {
        let Some(name) = basename(&script.filename) else {
            log.warn(format!(
                "Post-install script '{}' has no file name",
                script.filename
            ));
            continue;
        };
        let staged = build_dir.join(name);
        let dst = bin_dir.join(name);

        let result = io::write_text(&staged, &script.content)
            .and_then(|_| io::move_file(&staged, &dst))
            .and_then(|_| io::set_executable(&dst));
        match result {
            Ok(()) => log.placed.push(dst),
            Err(e) => log.warn(format!("Failed to install post-install script {name}: {e}")),
        }
    }
}

/// Remove one file, treating an already missing file as done.
fn remove_one(path: PathBuf, what: &str, log: &mut ArtifactLog) {
    match io::remove_file(&path) {
        Ok(()) => log.removed.push(path),
        Err(e) if e.is_not_found() => {
            tracing::debug!(path = %path.display(), "Already absent");
        }
        Err(e) => log.warn(format!("Failed to remove {what} {}: {e}", path.display())),
    }
}

pub(crate) fn remove_binaries(bin_dir: &Path, binaries: &[String], log: &mut ArtifactLog) {
    for name in binaries.iter().filter_map(|b| basename(b)) {
        remove_one(bin_dir.join(name), "binary", log);
    }
}

pub(crate) fn remove_configs(config_dir: &Path, configs: &[String], log: &mut ArtifactLog) {
    for name in configs.iter().filter_map(|c| basename(c)) {
        if is_record_file(Path::new(name)) {
            log.warn(format!("Config '{name}' names {RECORD_FILE}, leaving it in place"));
            continue;
        }
        remove_one(config_dir.join(name), "config", log);
    }
}

pub(crate) fn remove_man_pages(man_root: &Path, pages: &[String], log: &mut ArtifactLog) {
    for declared in pages {
        let (Some(name), Some(section)) = (basename(declared), man_section(declared)) else {
            continue;
        };
        remove_one(man_root.join(section).join(name), "man page", log);
    }
}

pub(crate) fn remove_scripts(bin_dir: &Path, scripts: &[Script], log: &mut ArtifactLog) {
    for name in scripts.iter().filter_map(|s| basename(&s.filename)) {
        remove_one(bin_dir.join(name), "post-install script", log);
    }
}
