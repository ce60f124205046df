//! User configuration for kit
//!
//! The configuration lives in `config.yaml` under the user's configuration
//! directory (`~/.config/kit/config.yaml` on Linux) unless `KIT_CONFIG`
//! points elsewhere. It is loaded once by the CLI and passed by reference to
//! every component that needs it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use kit_fs::ConfigStore;

use crate::duration::Interval;
use crate::error::{Error, Result};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "KIT_CONFIG";

const DEFAULT_REGISTRY_URL: &str = "https://github.com/lvim-tech/clipack-registry.git";
const DEFAULT_CONTENT_API_URL: &str =
    "https://api.github.com/repos/lvim-tech/clipack-registry/contents";

/// How a package is pinned when installed.
///
/// `Specific` installs the manifest's version tag; `Latest` follows the
/// upstream default branch and records the checked-out commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMethod {
    #[default]
    #[serde(alias = "version")]
    Specific,
    #[serde(alias = "commit")]
    Latest,
}

impl InstallMethod {
    pub fn is_latest(&self) -> bool {
        matches!(self, InstallMethod::Latest)
    }
}

impl FromStr for InstallMethod {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "version" | "specific" | "tag" => Ok(InstallMethod::Specific),
            "commit" | "latest" | "head" => Ok(InstallMethod::Latest),
            _ => Err(Error::InvalidInstallMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallMethod::Specific => write!(f, "specific"),
            InstallMethod::Latest => write!(f, "latest"),
        }
    }
}

/// Where manifests come from and how long the local copy stays fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Clone URL of the registry repository
    #[serde(default)]
    pub url: String,
    /// Base URL of the contents API serving the registry files
    #[serde(default, alias = "registryRepoURL")]
    pub repo_content_api_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Maximum cache age before the registry is fetched again
    #[serde(default)]
    pub update_interval: Interval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
            repo_content_api_url: DEFAULT_CONTENT_API_URL.to_string(),
            branch: default_branch(),
            update_interval: Interval::default(),
            token: None,
        }
    }
}

/// Directory layout. Every path must be absolute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub base: PathBuf,
    pub registry: PathBuf,
    pub bin: PathBuf,
    pub configs: PathBuf,
    pub build: PathBuf,
    pub man: PathBuf,
}

impl PathsConfig {
    pub fn under(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            registry: base.join("registry"),
            bin: base.join("bin"),
            configs: base.join("configs"),
            build: base.join("build"),
            man: base.join("man"),
        }
    }

    /// All managed directories except `base`, in creation order.
    pub fn managed_dirs(&self) -> [&Path; 5] {
        [
            &self.registry,
            &self.bin,
            &self.configs,
            &self.build,
            &self.man,
        ]
    }

    fn named(&self) -> [(&'static str, &Path); 6] {
        [
            ("base", &self.base),
            ("registry", &self.registry),
            ("bin", &self.bin),
            ("configs", &self.configs),
            ("build", &self.build),
            ("man", &self.man),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsConfig {
    #[serde(default = "default_true")]
    pub auto_symlink: bool,
    #[serde(default = "default_true")]
    pub backup_configs: bool,
    /// Remove the build directory after a successful install
    #[serde(default = "default_true")]
    pub cleanup_build: bool,
    /// Method used when the command line does not choose one
    #[serde(default)]
    pub install_method: InstallMethod,
}

fn default_true() -> bool {
    true
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            auto_symlink: true,
            backup_configs: true,
            cleanup_build: true,
            install_method: InstallMethod::default(),
        }
    }
}

/// Complete kit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub options: OptionsConfig,
}

impl Config {
    /// Default configuration with every directory placed under `base`.
    pub fn with_base(base: &Path) -> Self {
        Self {
            registry: RegistryConfig::default(),
            paths: PathsConfig::under(base),
            options: OptionsConfig::default(),
        }
    }

    /// Check the invariants every component relies on.
    ///
    /// Returns a human readable message describing the first violation.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.registry.url.trim().is_empty() {
            return Err("registry URL is required".into());
        }
        if self.registry.repo_content_api_url.trim().is_empty() {
            return Err("registry repo_content_api_url is required".into());
        }
        for (name, path) in self.paths.named() {
            if !path.is_absolute() {
                return Err(format!(
                    "paths.{name} must be absolute (got '{}')",
                    path.display()
                ));
            }
        }
        Ok(())
    }

    /// Write the configuration to `path` in the format implied by its extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }
}

/// Location of the configuration file.
///
/// `KIT_CONFIG` wins when set; otherwise `<config dir>/kit/config.yaml`.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("kit").join("config.yaml"))
        .ok_or(Error::NoConfigDir)
}

/// Load and validate the configuration at `path`.
///
/// Missing optional values fall back to defaults (branch `main`, a 24h
/// update interval, the `version` install method). A zero interval is
/// treated as unset.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut config: Config = ConfigStore::new().load(path)?;

    if config.registry.branch.trim().is_empty() {
        config.registry.branch = default_branch();
    }
    if config.registry.update_interval.is_zero() {
        tracing::debug!("update_interval is zero, using default");
        config.registry.update_interval = Interval::default();
    }

    config.validate().map_err(|message| Error::InvalidConfig {
        path: path.to_path_buf(),
        message,
    })?;

    Ok(config)
}
