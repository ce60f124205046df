//! The add-executables-path command

use std::path::{Path, PathBuf};

use colored::Colorize;
use kit_fs::io;
use kit_meta::{PathsConfig, ShellKind};

use crate::error::{CliError, Result};

/// Run the add-executables-path command for the shell named by `$SHELL`
pub fn run_add_executables_path(paths: &PathsConfig) -> Result<()> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::user("Could not determine the home directory."))?;
    let (rc, added) = add_paths(&ShellKind::detect(), &home, &paths.bin, &paths.man)?;

    if added {
        println!(
            "{} Paths added to {}. Restart your shell to pick them up.",
            "OK".green().bold(),
            rc.display().to_string().cyan()
        );
    } else {
        println!("{} {} already sets these paths", "=".blue(), rc.display());
    }
    Ok(())
}

/// Append the PATH/MANPATH snippet to the shell's rc file unless it is
/// already there. Returns the rc path and whether it changed.
fn add_paths(shell: &ShellKind, home: &Path, bin: &Path, man: &Path) -> Result<(PathBuf, bool)> {
    let rc = shell.rc_path(home)?;
    let snippet = shell.path_snippet(bin, man)?;

    let existing = match io::read_text(&rc) {
        Ok(text) => text,
        Err(e) if e.is_not_found() => String::new(),
        Err(e) => return Err(e.into()),
    };
    if existing.contains(snippet.trim()) {
        return Ok((rc, false));
    }

    io::append_text(&rc, &snippet)?;
    tracing::debug!(shell = %shell.name(), rc = %rc.display(), "Appended PATH snippet");
    Ok((rc, true))
}
