//! The install/update/remove state machine
//!
//! A package is in one of three states, derived on demand from the
//! [`StateStore`] and a registry manifest:
//!
//! - **Absent**: no record; `install` moves it to Installed
//! - **Installed**: the record matches the registry
//! - **UpdateAvailable**: the record differs; `update` re-installs
//!
//! `reinstall` rebuilds an installed package regardless of state, possibly with
//! a different install method. `remove` takes any installed package back to
//! Absent.
//!
//! Step failures abort the operation and leave earlier side effects in
//! place. File placement and removal are per file and best-effort.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use kit_fs::{io, validate_path_identifier};
use kit_git::RevisionSource;
use kit_meta::{Config, InstallMethod, InstalledRecord, PackageManifest};

use crate::artifacts::{self, ArtifactLog};
use crate::download::Downloader;
use crate::runner::run_steps;
use crate::store::StateStore;
use crate::{Error, Result};

/// What to do with a build directory left over from an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildDirPolicy {
    /// Fail with [`Error::BuildDirExists`]
    #[default]
    Refuse,
    /// Delete it and start clean
    Replace,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    pub method: InstallMethod,
    pub build_dir_policy: BuildDirPolicy,
}

/// Result of a completed install.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub record: InstalledRecord,
    /// Files written outside the build directory
    pub placed: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Installed identifier versus the registry's current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    pub method: InstallMethod,
    pub installed: String,
    pub available: String,
}

impl UpdateCheck {
    pub fn is_current(&self) -> bool {
        self.installed == self.available
    }

    /// Semantic-version ordering of `available` relative to `installed`.
    ///
    /// `None` for commit hashes and tags that are not semantic versions.
    pub fn direction(&self) -> Option<Ordering> {
        let parse = |v: &str| semver::Version::parse(v.trim_start_matches('v')).ok();
        Some(parse(&self.available)?.cmp(&parse(&self.installed)?))
    }
}

#[derive(Debug, Clone)]
pub enum PackageState {
    Absent,
    Installed(InstalledRecord),
    UpdateAvailable {
        record: InstalledRecord,
        candidate: PackageManifest,
        check: UpdateCheck,
    },
}

#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// Nothing changed on disk
    UpToDate(UpdateCheck),
    Updated {
        check: UpdateCheck,
        report: InstallReport,
    },
}

/// Result of removing a package.
#[derive(Debug, Clone, Default)]
pub struct RemoveReport {
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Applies manifests to the configured directories.
pub struct Reconciler<'a> {
    config: &'a Config,
    revisions: &'a dyn RevisionSource,
    downloader: &'a dyn Downloader,
    store: StateStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        config: &'a Config,
        revisions: &'a dyn RevisionSource,
        downloader: &'a dyn Downloader,
    ) -> Self {
        Self {
            config,
            revisions,
            downloader,
            store: StateStore::new(&config.paths.configs),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Build directory used for `name`.
    pub fn build_dir(&self, name: &str) -> PathBuf {
        self.config.paths.build.join(name)
    }

    /// Current state of the package described by `manifest`.
    ///
    /// For `latest` installs this asks the upstream repository for its HEAD.
    pub fn state(&self, manifest: &PackageManifest) -> Result<PackageState> {
        let Some(record) = self.store.get(&manifest.name)? else {
            return Ok(PackageState::Absent);
        };

        let check = self.check_update(&record, manifest)?;
        if check.is_current() {
            Ok(PackageState::Installed(record))
        } else {
            Ok(PackageState::UpdateAvailable {
                record,
                candidate: manifest.clone(),
                check,
            })
        }
    }

    /// Compare `record` with `manifest` using the method the record was installed with.
    pub fn check_update(
        &self,
        record: &InstalledRecord,
        manifest: &PackageManifest,
    ) -> Result<UpdateCheck> {
        let method = record.method();
        let available = match method {
            InstallMethod::Specific => pinned_version(manifest),
            InstallMethod::Latest => {
                let url = manifest
                    .upstream_url()
                    .or_else(|| record.manifest.upstream_url())
                    .ok_or_else(|| Error::NoUpstream {
                        package: manifest.name.clone(),
                    })?;
                self.revisions
                    .remote_revision(url)
                    .map_err(|source| Error::RevisionUnavailable {
                        package: manifest.name.clone(),
                        source,
                    })?
            }
        };

        Ok(UpdateCheck {
            method,
            installed: record.actual_version().to_string(),
            available,
        })
    }

    /// Build and place `manifest`, then record it as installed.
    pub fn install(
        &self,
        manifest: &PackageManifest,
        options: InstallOptions,
    ) -> Result<InstallReport> {
        let name = manifest.name.as_str();
        validate_path_identifier(name, "Package name")
            .map_err(|reason| Error::InvalidName { reason })?;

        let build_dir = self.build_dir(name);
        self.prepare_build_dir(&build_dir, options.build_dir_policy)?;

        let paths = &self.config.paths;
        let config_dir = self.store.package_dir(name)?;
        for dir in [
            paths.bin.as_path(),
            config_dir.as_path(),
            paths.build.as_path(),
            paths.man.as_path(),
            build_dir.as_path(),
        ] {
            io::ensure_dir(dir)?;
        }

        tracing::info!(package = %name, method = %options.method, "Installing");

        let spec = &manifest.install;
        run_steps(
            name,
            &spec.steps,
            &build_dir,
            &spec.environment,
            options.method,
        )?;

        artifacts::check_binaries(name, &build_dir, &spec.binaries)?;

        let mut log = ArtifactLog::new(name);
        artifacts::install_binaries(&build_dir, &paths.bin, &spec.binaries, &mut log);
        artifacts::install_configs(&build_dir, &config_dir, &spec.configs, &mut log);
        artifacts::install_man_pages(&build_dir, &paths.man, &spec.man, &mut log);
        artifacts::write_additional_configs(
            &config_dir,
            &spec.additional_config,
            self.downloader,
            &mut log,
        );
        artifacts::install_scripts(
            &build_dir,
            &paths.bin,
            &manifest.post_install.scripts,
            &mut log,
        );

        let actual_version = match options.method {
            InstallMethod::Specific => pinned_version(manifest),
            InstallMethod::Latest => self
                .revisions
                .local_revision(&build_dir)
                .map_err(|source| Error::RevisionUnavailable {
                    package: name.to_string(),
                    source,
                })?,
        };

        let record = InstalledRecord::stamp(manifest, options.method, actual_version);
        self.store.write(&record)?;

        if self.config.options.cleanup_build
            && let Err(e) = io::remove_dir_all_if_exists(&build_dir)
        {
            log.warn(format!("Failed to clean up build directory: {e}"));
        }

        tracing::info!(
            package = %name,
            version = %record.actual_version(),
            warnings = log.warnings.len(),
            "Installed"
        );

        Ok(InstallReport {
            record,
            placed: log.placed,
            warnings: log.warnings,
        })
    }

    /// Re-install `manifest` if it differs from the installed record.
    ///
    /// The record's own install method decides what "differs" means. The
    /// previous record's files are removed before the new install runs.
    pub fn update(
        &self,
        manifest: &PackageManifest,
        build_dir_policy: BuildDirPolicy,
    ) -> Result<UpdateOutcome> {
        let record = self.installed(&manifest.name)?;
        let check = self.check_update(&record, manifest)?;
        self.apply_update(&record, manifest, check, build_dir_policy)
    }

    /// Act on an [`UpdateCheck`] already computed for `record`.
    ///
    /// Does not look at the upstream repository again.
    pub fn apply_update(
        &self,
        record: &InstalledRecord,
        manifest: &PackageManifest,
        check: UpdateCheck,
        build_dir_policy: BuildDirPolicy,
    ) -> Result<UpdateOutcome> {
        if check.is_current() {
            tracing::info!(package = %manifest.name, version = %check.installed, "Up to date");
            return Ok(UpdateOutcome::UpToDate(check));
        }

        tracing::info!(
            package = %manifest.name,
            from = %check.installed,
            to = %check.available,
            "Updating"
        );

        let report = self.replace(
            record,
            manifest,
            InstallOptions {
                method: record.method(),
                build_dir_policy,
            },
        )?;
        Ok(UpdateOutcome::Updated { check, report })
    }

    /// Install `manifest` over an existing install, whatever its state.
    ///
    /// The previous record's files are removed first, so switching method or
    /// dropping a binary leaves nothing stale behind.
    pub fn reinstall(
        &self,
        manifest: &PackageManifest,
        options: InstallOptions,
    ) -> Result<InstallReport> {
        let record = self.installed(&manifest.name)?;
        tracing::info!(
            package = %manifest.name,
            from = %record.method(),
            to = %options.method,
            "Reinstalling"
        );
        self.replace(&record, manifest, options)
    }

    fn installed(&self, name: &str) -> Result<InstalledRecord> {
        self.store.get(name)?.ok_or_else(|| Error::NotInstalled {
            name: name.to_string(),
        })
    }

    /// Tear down `record` and install `manifest` in its place.
    ///
    /// A refused build directory fails before anything is removed.
    fn replace(
        &self,
        record: &InstalledRecord,
        manifest: &PackageManifest,
        options: InstallOptions,
    ) -> Result<InstallReport> {
        let build_dir = self.build_dir(&manifest.name);
        if build_dir.exists() && options.build_dir_policy == BuildDirPolicy::Refuse {
            return Err(Error::BuildDirExists { path: build_dir });
        }

        let mut teardown = ArtifactLog::new(&manifest.name);
        self.remove_files(record, &mut teardown);

        let mut report = self.install(manifest, options)?;
        teardown.warnings.append(&mut report.warnings);
        report.warnings = teardown.warnings;
        Ok(report)
    }

    /// Remove an installed package.
    ///
    /// Every artifact is removed independently; failures become warnings and
    /// the package still counts as removed.
    pub fn remove(&self, name: &str) -> Result<RemoveReport> {
        let record = self.installed(name)?;

        let mut log = ArtifactLog::new(name);

        let config_dir = self.store.package_dir(name)?;
        match self.store.remove(name) {
            Ok(()) => log.removed.push(config_dir),
            Err(e) => log.warn(format!("Failed to remove config directory: {e}")),
        }

        let spec = &record.manifest.install;
        let paths = &self.config.paths;
        artifacts::remove_binaries(&paths.bin, &spec.binaries, &mut log);
        artifacts::remove_man_pages(&paths.man, &spec.man, &mut log);
        artifacts::remove_scripts(&paths.bin, &record.manifest.post_install.scripts, &mut log);

        tracing::info!(package = %name, warnings = log.warnings.len(), "Removed");

        Ok(RemoveReport {
            removed: log.removed,
            warnings: log.warnings,
        })
    }

    /// Teardown before an update: the previous record's declared files.
    fn remove_files(&self, record: &InstalledRecord, log: &mut ArtifactLog) {
        let spec = &record.manifest.install;
        let paths = &self.config.paths;
        artifacts::remove_binaries(&paths.bin, &spec.binaries, log);
        if let Ok(config_dir) = self.store.package_dir(record.name()) {
            artifacts::remove_configs(&config_dir, &spec.configs, log);
        }
        artifacts::remove_man_pages(&paths.man, &spec.man, log);
        artifacts::remove_scripts(&paths.bin, &record.manifest.post_install.scripts, log);
    }

    fn prepare_build_dir(&self, build_dir: &Path, policy: BuildDirPolicy) -> Result<()> {
        if !build_dir.exists() {
            return Ok(());
        }
        match policy {
            BuildDirPolicy::Refuse => Err(Error::BuildDirExists {
                path: build_dir.to_path_buf(),
            }),
            BuildDirPolicy::Replace => {
                tracing::debug!(path = %build_dir.display(), "Removing previous build directory");
                io::remove_dir_all_if_exists(build_dir)?;
                Ok(())
            }
        }
    }
}

/// Identifier recorded for `specific` installs: the tag, else the commit.
fn pinned_version(manifest: &PackageManifest) -> String {
    manifest
        .version
        .clone()
        .or_else(|| manifest.commit.clone())
        .unwrap_or_default()
}
