//! Local registry snapshot
//!
//! Two files under the registry directory:
//!
//! - `packages_cache.bin`: the package list
//! - `cache_timestamp.bin`: when that list was fetched
//!
//! The package list is always written before the timestamp, so a reader
//! never sees a timestamp newer than the list it describes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use kit_fs::io;
use kit_meta::PackageManifest;

use crate::{Error, Result};

pub const PACKAGES_FILE: &str = "packages_cache.bin";
pub const TIMESTAMP_FILE: &str = "cache_timestamp.bin";

/// Why the cache could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// One of the two files does not exist
    Absent,
    /// A file exists but could not be read
    Unreadable(String),
    /// A file was read but does not decode
    Corrupt(String),
    /// The snapshot is older than the configured maximum age
    Stale { age: Duration },
}

/// Result of a cache lookup. A miss is not an error; it means "fetch".
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Vec<PackageManifest>),
    Miss(MissReason),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

// `category` is skipped by the manifest's own serde impl.
#[derive(Serialize, Deserialize)]
struct CachedManifest {
    category: Option<String>,
    manifest: PackageManifest,
}

/// Time-bounded snapshot of the registry package list.
#[derive(Debug, Clone)]
pub struct RegistryCache {
    dir: PathBuf,
    max_age: Duration,
}

impl RegistryCache {
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn packages_path(&self) -> PathBuf {
        self.dir.join(PACKAGES_FILE)
    }

    pub fn timestamp_path(&self) -> PathBuf {
        self.dir.join(TIMESTAMP_FILE)
    }

    /// Look up the snapshot against the current time.
    pub fn load(&self) -> CacheLookup {
        self.load_at(Utc::now())
    }

    /// Look up the snapshot as of `now`.
    ///
    /// The snapshot is fresh while `now - saved_at <= max_age`.
    pub fn load_at(&self, now: DateTime<Utc>) -> CacheLookup {
        let saved_at: DateTime<Utc> = match self.read_decoded(&self.timestamp_path()) {
            Ok(ts) => ts,
            Err(reason) => return self.miss(reason),
        };

        let age = now.signed_duration_since(saved_at);
        let max_age = TimeDelta::from_std(self.max_age).unwrap_or(TimeDelta::MAX);
        if age > max_age {
            let age = age.to_std().unwrap_or_default();
            return self.miss(MissReason::Stale { age });
        }

        let entries: Vec<CachedManifest> = match self.read_decoded(&self.packages_path()) {
            Ok(entries) => entries,
            Err(reason) => return self.miss(reason),
        };

        let packages: Vec<PackageManifest> = entries
            .into_iter()
            .map(|entry| PackageManifest {
                category: entry.category,
                ..entry.manifest
            })
            .collect();

        tracing::debug!(count = packages.len(), "Registry cache hit");
        CacheLookup::Hit(packages)
    }

    /// Store `packages` with the current time.
    pub fn save(&self, packages: &[PackageManifest]) -> Result<()> {
        self.save_at(packages, Utc::now())
    }

    /// Store `packages` stamped with `saved_at`.
    pub fn save_at(&self, packages: &[PackageManifest], saved_at: DateTime<Utc>) -> Result<()> {
        let entries: Vec<CachedManifest> = packages
            .iter()
            .map(|manifest| CachedManifest {
                category: manifest.category.clone(),
                manifest: manifest.clone(),
            })
            .collect();

        let packages_path = self.packages_path();
        let bytes = bincode::serialize(&entries).map_err(|source| Error::CacheCodec {
            path: packages_path.clone(),
            source,
        })?;
        io::write_atomic(&packages_path, &bytes)?;

        let timestamp_path = self.timestamp_path();
        let bytes = bincode::serialize(&saved_at).map_err(|source| Error::CacheCodec {
            path: timestamp_path.clone(),
            source,
        })?;
        io::write_atomic(&timestamp_path, &bytes)?;

        tracing::debug!(count = packages.len(), dir = %self.dir.display(), "Registry cache saved");
        Ok(())
    }

    /// Delete both cache files. Missing files are fine.
    pub fn invalidate(&self) -> Result<()> {
        for path in [self.packages_path(), self.timestamp_path()] {
            match io::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::debug!(dir = %self.dir.display(), "Registry cache invalidated");
        Ok(())
    }

    fn read_decoded<T: for<'de> Deserialize<'de>>(
        &self,
        path: &Path,
    ) -> std::result::Result<T, MissReason> {
        let bytes = io::read_bytes(path).map_err(|e| {
            if e.is_not_found() {
                MissReason::Absent
            } else {
                MissReason::Unreadable(e.to_string())
            }
        })?;
        bincode::deserialize(&bytes).map_err(|e| MissReason::Corrupt(e.to_string()))
    }

    fn miss(&self, reason: MissReason) -> CacheLookup {
        tracing::debug!(reason = ?reason, "Registry cache miss");
        CacheLookup::Miss(reason)
    }
}
