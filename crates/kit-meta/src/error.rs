//! Error types for kit-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] kit_fs::Error),

    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,

    #[error("Invalid install method: {method} (expected 'version' or 'commit')")]
    InvalidInstallMethod { method: String },

    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Unsupported shell: {shell}")]
    UnsupportedShell { shell: String },

    #[error("Failed to parse manifest: {0}")]
    ManifestParse(#[source] serde_yaml::Error),

    #[error("Failed to serialize manifest: {0}")]
    ManifestSerialize(#[source] serde_yaml::Error),
}
