//! Test doubles and helpers for reconciler tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use kit_core::{Downloader, Error, Result};
use kit_git::{GitRevisions, RevisionSource};

/// Answers remote lookups from a settable value and local lookups from disk.
pub struct FakeRevisions {
    remote: RefCell<String>,
    pub remote_calls: RefCell<Vec<String>>,
}

impl FakeRevisions {
    pub fn new(remote: &str) -> Self {
        Self {
            remote: RefCell::new(remote.to_string()),
            remote_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn set_remote(&self, remote: &str) {
        *self.remote.borrow_mut() = remote.to_string();
    }
}

impl RevisionSource for FakeRevisions {
    fn local_revision(&self, dir: &Path) -> kit_git::Result<String> {
        GitRevisions.local_revision(dir)
    }

    fn remote_revision(&self, url: &str) -> kit_git::Result<String> {
        self.remote_calls.borrow_mut().push(url.to_string());
        Ok(self.remote.borrow().clone())
    }
}

/// Serves downloads from a map; unknown URLs fail.
#[derive(Default)]
pub struct MapDownloader {
    files: HashMap<String, String>,
}

impl MapDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, content: &str) -> Self {
        self.files.insert(url.to_string(), content.to_string());
        self
    }
}

impl Downloader for MapDownloader {
    fn download(&self, url: &str) -> Result<String> {
        self.files.get(url).cloned().ok_or_else(|| Error::Download {
            url: url.to_string(),
            message: "status 404 Not Found".to_string(),
        })
    }
}

/// Every file under `root` with its length and modification time.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, (u64, Option<SystemTime>)> {
    let mut out = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let meta = entry.metadata().unwrap();
            if meta.is_dir() {
                pending.push(path.clone());
            }
            out.insert(path, (meta.len(), meta.modified().ok()));
        }
    }
    out
}

#[cfg(unix)]
pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}
