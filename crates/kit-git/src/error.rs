//! Error types for kit-git

use std::path::PathBuf;

/// Result type for kit-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kit-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("No git repository found in {path}")]
    NoRepository { path: PathBuf },

    #[error("Remote {url} does not advertise a HEAD")]
    RemoteHeadMissing { url: String },
}
