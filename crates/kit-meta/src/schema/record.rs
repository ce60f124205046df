//! Installed-state records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::manifest::PackageManifest;
use crate::config::InstallMethod;

/// How and when a package was installed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    pub method: InstallMethod,
    /// Version tag for `specific`, resolved commit hash for `latest`
    pub actual_version: String,
    pub installed_at: DateTime<Utc>,
    pub installed_by: String,
}

/// The on-disk record of an installed package.
///
/// Serialized as the manifest's own fields plus `install_method` and an
/// `installation` block, so a record is still readable as a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledRecord {
    #[serde(flatten)]
    pub manifest: PackageManifest,
    pub install_method: InstallMethod,
    pub installation: Installation,
}

impl InstalledRecord {
    /// Stamp a copy of `manifest` with the current time and user.
    pub fn stamp(
        manifest: &PackageManifest,
        method: InstallMethod,
        actual_version: impl Into<String>,
    ) -> Self {
        Self {
            manifest: manifest.clone(),
            install_method: method,
            installation: Installation {
                method,
                actual_version: actual_version.into(),
                installed_at: Utc::now(),
                installed_by: current_user(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn method(&self) -> InstallMethod {
        self.installation.method
    }

    pub fn actual_version(&self) -> &str {
        &self.installation.actual_version
    }
}

/// Name of the invoking user from `USER` or `USERNAME`, else `unknown`.
pub fn current_user() -> String {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
