//! Package manifest and installed-record schema
//!
//! - [`PackageManifest`]: a registry entry describing how to build and place a package
//! - [`InstalledRecord`]: a manifest snapshot stamped with how it was installed

mod manifest;
mod record;

pub use manifest::{
    AdditionalConfig, InstallSpec, PackageManifest, PostInstallSpec, Script, Source,
    man_section, parse_manifest, serialize_manifest,
};
pub use record::{Installation, InstalledRecord, current_user};
