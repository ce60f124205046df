//! Cache-then-fetch access to the package list

use kit_meta::{Config, PackageManifest};

use crate::cache::{CacheLookup, RegistryCache};
use crate::fetch::{ContentSource, Fetcher, GithubContentSource};
use crate::{Error, Result};

/// The package list as callers see it: cached when fresh, fetched otherwise.
pub struct Registry {
    cache: RegistryCache,
    source: Box<dyn ContentSource>,
}

impl Registry {
    pub fn new(cache: RegistryCache, source: Box<dyn ContentSource>) -> Self {
        Self { cache, source }
    }

    /// Registry backed by the configured contents API and cache directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = RegistryCache::new(
            &config.paths.registry,
            config.registry.update_interval.as_duration(),
        );
        let source = GithubContentSource::from_config(&config.registry)?;
        Ok(Self::new(cache, Box::new(source)))
    }

    pub fn cache(&self) -> &RegistryCache {
        &self.cache
    }

    pub fn fetcher(&self) -> Fetcher<'_> {
        Fetcher::new(self.source.as_ref())
    }

    /// All packages in the registry.
    ///
    /// `force_refresh` discards the cache first. A failure to store the
    /// fetched list is logged and does not fail the call.
    pub fn load(&self, force_refresh: bool) -> Result<Vec<PackageManifest>> {
        if force_refresh {
            self.cache.invalidate()?;
        } else if let CacheLookup::Hit(packages) = self.cache.load() {
            return Ok(packages);
        }

        let outcome = self.fetcher().fetch_all()?;

        if let Err(e) = self.cache.save(&outcome.packages) {
            tracing::warn!(error = %e, "Failed to save registry cache");
        }

        Ok(outcome.packages)
    }

    /// The package named exactly `name`.
    ///
    /// Served from a fresh cache when it has the package, otherwise from a
    /// single-manifest fetch.
    pub fn find(&self, name: &str, force_refresh: bool) -> Result<PackageManifest> {
        if force_refresh {
            self.cache.invalidate()?;
        } else if let CacheLookup::Hit(packages) = self.cache.load()
            && let Some(found) = packages.into_iter().find(|p| p.name == name)
        {
            return Ok(found);
        }

        let not_found = || Error::NotFound {
            name: name.to_string(),
        };

        let manifest = self.fetcher().fetch_by_name(name)?;
        if manifest.name != name {
            tracing::debug!(
                requested = %name,
                found = %manifest.name,
                "Index entry names a different package"
            );
            return Err(not_found());
        }
        Ok(manifest)
    }
}
