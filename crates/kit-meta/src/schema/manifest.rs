//! Package manifest definitions

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// A package as published in the registry.
///
/// Every field is defaulted so sparse manifests parse. `category` comes from
/// the manifest's location in the registry, not from its content, and is
/// never read from or written to YAML.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: String,
    /// Release tag installed by the `specific` method
    #[serde(default)]
    pub version: Option<String>,
    /// Revision the release tag points at, when the registry records it
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub maintainer: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub install: InstallSpec,
    #[serde(default, rename = "post-install")]
    pub post_install: PostInstallSpec,
    #[serde(skip)]
    pub category: Option<String>,
}

/// The recipe for building and placing a package.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstallSpec {
    /// Variables added to the environment of every step
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Shell lines run in order inside the build directory
    #[serde(default)]
    pub steps: Vec<String>,
    /// Build outputs copied into the shared bin directory
    #[serde(default)]
    pub binaries: Vec<String>,
    #[serde(default)]
    pub configs: Vec<String>,
    #[serde(default)]
    pub man: Vec<String>,
    #[serde(default, rename = "additional-config")]
    pub additional_config: Vec<AdditionalConfig>,
    /// Upstream repository, used to check "latest" installs for updates
    #[serde(default)]
    pub source: Option<Source>,
}

/// A file written into the package config directory.
///
/// `content` is either literal text or an `http(s)://` URL to download.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdditionalConfig {
    pub filename: String,
    #[serde(default)]
    pub content: String,
}

impl AdditionalConfig {
    pub fn is_remote(&self) -> bool {
        let content = self.content.trim();
        content.starts_with("http://") || content.starts_with("https://")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostInstallSpec {
    #[serde(default)]
    pub scripts: Vec<Script>,
}

/// An executable script placed into the shared bin directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Script {
    pub filename: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "ref")]
    pub reference: String,
}

impl PackageManifest {
    /// Check that the manifest can be used as a registry entry.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("package name is empty".into());
        }
        Ok(())
    }

    /// Repository queried for the current upstream revision.
    ///
    /// Prefers `install.source.url` and falls back to `homepage`.
    pub fn upstream_url(&self) -> Option<&str> {
        self.install
            .source
            .as_ref()
            .map(|s| s.url.trim())
            .filter(|u| !u.is_empty())
            .or_else(|| Some(self.homepage.trim()).filter(|h| !h.is_empty()))
    }

    /// Version for display: the tag, else the commit, else `-`.
    pub fn display_version(&self) -> &str {
        self.version
            .as_deref()
            .or(self.commit.as_deref())
            .unwrap_or("-")
    }
}

/// Parse a manifest from YAML.
///
/// Only structure is checked here; see [`PackageManifest::validate`].
pub fn parse_manifest(bytes: &[u8]) -> Result<PackageManifest> {
    serde_yaml::from_slice(bytes).map_err(Error::ManifestParse)
}

/// Serialize a manifest to YAML.
pub fn serialize_manifest(manifest: &PackageManifest) -> Result<Vec<u8>> {
    serde_yaml::to_string(manifest)
        .map(String::into_bytes)
        .map_err(Error::ManifestSerialize)
}

/// Man page section directory for a declared man page path.
///
/// `foo.3` maps to `man3` and `foo.1p` to `man1p`. Returns `None` when the
/// file has no extension or the extension does not start with a section
/// number (`1`-`9`) or `n`/`l`.
pub fn man_section(path: &str) -> Option<String> {
    let ext = Path::new(path).extension()?.to_str()?;
    match ext.chars().next()? {
        '1'..='9' | 'n' | 'l' => Some(format!("man{ext}")),
        _ => None,
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(text) = raw.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        });

    if parsed.is_none() {
        tracing::warn!(value = %text, "Ignoring unrecognised updated_at timestamp");
    }
    Ok(parsed)
}
