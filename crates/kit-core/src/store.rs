//! Installed-state store
//!
//! Each installed package owns `<configs>/<name>/`, which holds its copied
//! config files and a `package.yaml` record. The store is the only authority
//! on what is installed; the registry has no say.

use std::fs;
use std::path::{Path, PathBuf};

use kit_fs::{ConfigStore, io, validate_path_identifier};
use kit_meta::InstalledRecord;

use crate::{Error, Result};

pub const RECORD_FILE: &str = "package.yaml";

/// Reads and writes installed records under a configs root.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
    files: ConfigStore,
}

impl StateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: ConfigStore::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<name>`, after checking that `name` is a single path component.
    pub fn package_dir(&self, name: &str) -> Result<PathBuf> {
        validate_path_identifier(name, "Package name")
            .map_err(|reason| Error::InvalidName { reason })?;
        Ok(self.root.join(name))
    }

    pub fn record_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.package_dir(name)?.join(RECORD_FILE))
    }

    /// Every readable record, sorted by package name.
    ///
    /// A missing root means nothing is installed. Records that cannot be read
    /// or parsed are skipped with a warning.
    pub fn list(&self) -> Result<Vec<InstalledRecord>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| kit_fs::Error::io(&self.root, e))?;

        let mut records = Vec::new();
        for entry in entries {
            let Some(dir) = package_dir_entry(&self.root, entry) else {
                continue;
            };
            let path = dir.join(RECORD_FILE);
            if !path.exists() {
                tracing::debug!(path = %dir.display(), "Skipping directory without a record");
                continue;
            }

            match self.files.load::<InstalledRecord>(&path) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable installed record");
                }
            }
        }

        records.sort_by(|a, b| a.manifest.name.cmp(&b.manifest.name));
        Ok(records)
    }

    /// The record for `name`, or `None` when it is not installed.
    pub fn get(&self, name: &str) -> Result<Option<InstalledRecord>> {
        let path = self.record_path(name)?;
        if !path.exists() {
            return Ok(None);
        }

        self.files
            .load(&path)
            .map(Some)
            .map_err(|e| Error::RecordParse {
                name: name.to_string(),
                path,
                message: e.to_string(),
            })
    }

    /// Write `record`, replacing any previous record for the same name.
    pub fn write(&self, record: &InstalledRecord) -> Result<()> {
        let path = self.record_path(record.name())?;
        self.files.save(&path, record)?;
        tracing::debug!(package = %record.name(), path = %path.display(), "Installed record written");
        Ok(())
    }

    /// Delete the package's whole directory, record included.
    pub fn remove(&self, name: &str) -> Result<()> {
        let dir = self.package_dir(name)?;
        io::remove_dir_all_if_exists(&dir)?;
        Ok(())
    }
}

/// Directory path of a `read_dir` entry; `None` for files and unreadable entries.
fn package_dir_entry(root: &Path, entry: std::io::Result<fs::DirEntry>) -> Option<PathBuf> {
    match entry {
        Ok(entry) => Some(entry.path()).filter(|path| path.is_dir()),
        Err(e) => {
            tracing::warn!(root = %root.display(), error = %e, "Skipping unreadable directory entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_entry_is_skipped() {
        let entry = Err(std::io::Error::other("stale handle"));
        assert_eq!(package_dir_entry(Path::new("/tmp/kit-configs"), entry), None);
    }

    #[test]
    fn only_directories_are_package_entries() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("foo")).unwrap();
        fs::write(root.path().join("stray.txt"), "").unwrap();

        let mut dirs: Vec<PathBuf> = fs::read_dir(root.path())
            .unwrap()
            .filter_map(|entry| package_dir_entry(root.path(), entry))
            .collect();
        dirs.sort();

        assert_eq!(dirs, vec![root.path().join("foo")]);
    }

    #[test]
    fn rejects_traversal_names() {
        let store = StateStore::new("/tmp/kit-configs");
        assert!(matches!(
            store.package_dir("../etc"),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(store.get(".."), Err(Error::InvalidName { .. })));
    }

    #[test]
    fn missing_root_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }
}
