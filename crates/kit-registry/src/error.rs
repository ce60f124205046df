//! Error types for kit-registry

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] kit_fs::Error),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("No download URL available for {path}")]
    MissingDownloadUrl { path: String },

    #[error("Invalid registry index: {message}")]
    Index { message: String },

    #[error("No packages listed in the registry index")]
    EmptyIndex,

    #[error("No valid packages found in registry ({skipped} skipped)")]
    NoPackages { skipped: usize },

    #[error("Package not found: {name}")]
    NotFound { name: String },

    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: kit_meta::Error,
    },

    #[error("Manifest {path} has an empty name")]
    EmptyName { path: String },

    #[error("Cache encoding failed for {path}: {source}")]
    CacheCodec {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
}
