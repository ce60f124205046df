//! Configuration and metadata for kit
//!
//! This crate owns the on-disk shapes the rest of the workspace agrees on:
//!
//! - [`config`]: the user's `config.yaml` (registry, paths, options)
//! - [`schema`]: package manifests and installed-state records
//! - [`shell`]: the closed set of shells kit knows how to configure
//! - [`duration`]: `24h` / `1h30m` style intervals used by the config

pub mod config;
pub mod duration;
pub mod error;
pub mod schema;
pub mod shell;

pub use config::{
    CONFIG_ENV, Config, InstallMethod, OptionsConfig, PathsConfig, RegistryConfig,
    default_config_path, load_config,
};
pub use duration::{Interval, format_duration, parse_duration};
pub use error::{Error, Result};
pub use schema::{
    AdditionalConfig, InstallSpec, Installation, InstalledRecord, PackageManifest,
    PostInstallSpec, Script, Source, man_section, parse_manifest, serialize_manifest,
};
pub use shell::{PosixShell, ShellKind};
