//! Error types for kit-core

use std::path::PathBuf;

/// Result type for kit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kit-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The build directory is left over from an earlier run
    #[error("Build directory already exists: {path}")]
    BuildDirExists { path: PathBuf },

    /// An install step could not be spawned or exited non-zero
    #[error("Install step for {package} failed ({reason}): {step}")]
    StepFailed {
        package: String,
        step: String,
        reason: String,
    },

    /// A declared binary was not produced by the build
    #[error("Binary {path} for {package} was not found after build")]
    MissingBinary { package: String, path: PathBuf },

    #[error("Package is not installed: {name}")]
    NotInstalled { name: String },

    #[error("Invalid package name: {reason}")]
    InvalidName { reason: String },

    #[error("Installed record for {name} at {path} is unreadable: {message}")]
    RecordParse {
        name: String,
        path: PathBuf,
        message: String,
    },

    #[error("No upstream repository known for {package}")]
    NoUpstream { package: String },

    #[error("Could not resolve revision for {package}: {source}")]
    RevisionUnavailable {
        package: String,
        #[source]
        source: kit_git::Error,
    },

    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Fs(#[from] kit_fs::Error),

    #[error(transparent)]
    Meta(#[from] kit_meta::Error),
}
