//! Per-invocation state shared by the package commands
//!
//! Loads the configuration once and hands out the registry and reconciler
//! built from it.

use std::path::Path;

use kit_core::{HttpDownloader, Reconciler, StateStore};
use kit_git::GitRevisions;
use kit_meta::{Config, default_config_path, load_config};
use kit_registry::Registry;

use crate::error::{CliError, Result};

pub struct Context {
    pub config: Config,
    revisions: GitRevisions,
    downloader: HttpDownloader,
}

impl Context {
    /// Load the configuration from `KIT_CONFIG` or the per-user location.
    pub fn load() -> Result<Self> {
        let path = default_config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config = load_config(path).map_err(|e| match e {
            kit_meta::Error::ConfigNotFound { path } => CliError::user(format!(
                "No configuration at {}. Run `kit init-config` first.",
                path.display()
            )),
            other => other.into(),
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");

        Ok(Self {
            config,
            revisions: GitRevisions::new(),
            downloader: HttpDownloader::new()?,
        })
    }

    pub fn registry(&self) -> Result<Registry> {
        Ok(Registry::from_config(&self.config)?)
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(&self.config, &self.revisions, &self.downloader)
    }

    pub fn store(&self) -> StateStore {
        StateStore::new(&self.config.paths.configs)
    }
}
