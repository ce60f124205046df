//! The init-config command

use std::path::{Path, PathBuf};

use colored::Colorize;
use kit_fs::io;
use kit_meta::Config;

use crate::error::{CliError, Result};
use crate::interactive;

const DEFAULT_BASE_DIR: &str = "kit_apps";

/// Write a default configuration to `config_path` and create its directories.
///
/// An existing configuration is left untouched. Without `base`, the user is
/// asked for one, defaulting to `~/kit_apps`.
pub fn run_init_config(config_path: &Path, base: Option<PathBuf>) -> Result<()> {
    if config_path.exists() {
        println!(
            "{} Configuration already exists at {}",
            "=".blue(),
            config_path.display()
        );
        return Ok(());
    }

    let home = dirs::home_dir();
    let base = match base {
        Some(base) => base,
        None => {
            let default = home
                .as_deref()
                .map(|h| h.join(DEFAULT_BASE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));
            let answer = interactive::input(
                "Installation directory",
                &default.display().to_string(),
            )?;
            expand_home(&answer, home.as_deref())
        }
    };
    if !base.is_absolute() {
        return Err(CliError::user(format!(
            "Installation directory must be absolute (got '{}')",
            base.display()
        )));
    }

    let config = Config::with_base(&base);
    config.save(config_path)?;
    for dir in config.paths.managed_dirs() {
        io::ensure_dir(dir)?;
    }

    println!(
        "{} Wrote {}",
        "OK".green().bold(),
        config_path.display().to_string().cyan()
    );
    println!("  {:<10} {}", "base:".dimmed(), base.display());
    println!(
        "Run {} to put {} on your PATH.",
        "kit add-executables-path".cyan(),
        config.paths.bin.display()
    );
    Ok(())
}

/// Expand a leading `~/` against `home`.
fn expand_home(input: &str, home: Option<&Path>) -> PathBuf {
    match (input.trim().strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(input.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_config_and_creates_dirs() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("kit").join("config.yaml");
        let base = temp.path().join("apps");

        run_init_config(&config_path, Some(base.clone())).unwrap();

        let loaded = kit_meta::load_config(&config_path).unwrap();
        assert_eq!(loaded.paths.base, base);
        for dir in loaded.paths.managed_dirs() {
            assert!(dir.is_dir(), "{} should exist", dir.display());
        }
    }

    #[test]
    fn existing_config_is_kept() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "keep: me\n").unwrap();

        run_init_config(&config_path, Some(temp.path().join("apps"))).unwrap();

        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "keep: me\n");
    }

    #[test]
    fn relative_base_is_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");

        let result = run_init_config(&config_path, Some(PathBuf::from("apps")));

        assert!(matches!(result, Err(CliError::User { .. })));
        assert!(!config_path.exists());
    }

    #[test]
    fn expand_home_prefix() {
        let home = Path::new("/home/u");
        assert_eq!(expand_home("~/apps", Some(home)), PathBuf::from("/home/u/apps"));
        assert_eq!(expand_home("/opt/kit", Some(home)), PathBuf::from("/opt/kit"));
        assert_eq!(expand_home("~/apps", None), PathBuf::from("~/apps"));
    }
}
