//! Commit resolution for local checkouts and remotes

use std::fs;
use std::path::Path;

use git2::{Direction, Remote, Repository};

use crate::{Error, Result};

/// Resolves commit hashes for "latest" installs.
///
/// The reconciler only depends on this trait so tests can substitute a fixed
/// answer instead of touching the network.
pub trait RevisionSource {
    /// Full commit hash checked out in `dir`.
    ///
    /// `dir` is usually a build directory; when it is not itself a repository
    /// the first immediate subdirectory that is one is used (install steps
    /// typically `git clone` into a child directory).
    fn local_revision(&self, dir: &Path) -> Result<String>;

    /// Full commit hash currently advertised as `HEAD` by the remote at `url`.
    fn remote_revision(&self, url: &str) -> Result<String>;
}

/// [`RevisionSource`] backed by libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitRevisions;

impl GitRevisions {
    pub fn new() -> Self {
        Self
    }

    fn head_of(repo: &Repository) -> Result<String> {
        let commit = repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }
}

impl RevisionSource for GitRevisions {
    fn local_revision(&self, dir: &Path) -> Result<String> {
        if let Ok(repo) = Repository::open(dir) {
            return Self::head_of(&repo);
        }

        let mut children: Vec<_> = fs::read_dir(dir)
            .map_err(|_| Error::NoRepository {
                path: dir.to_path_buf(),
            })?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        children.sort();

        for child in children {
            if let Ok(repo) = Repository::open(&child) {
                tracing::debug!(path = %child.display(), "Resolved checkout below build directory");
                return Self::head_of(&repo);
            }
        }

        Err(Error::NoRepository {
            path: dir.to_path_buf(),
        })
    }

    fn remote_revision(&self, url: &str) -> Result<String> {
        let mut remote = Remote::create_detached(url)?;
        remote.connect(Direction::Fetch)?;

        let head = remote
            .list()?
            .iter()
            .find(|h| h.name() == "HEAD")
            .map(|h| h.oid().to_string());

        if let Err(e) = remote.disconnect() {
            tracing::debug!(url = %url, error = %e, "Failed to disconnect from remote");
        }

        head.ok_or_else(|| Error::RemoteHeadMissing {
            url: url.to_string(),
        })
    }
}

/// Abbreviate a commit hash to 7 characters for display.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}
