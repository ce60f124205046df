//! Remote registry reader
//!
//! The registry root holds an `index.yaml` listing manifest paths relative to
//! the root, conventionally `<root>/<category>/<name>.yaml`. A single bad
//! manifest is skipped so one contributor's mistake cannot block everyone
//! else; a bad index is fatal.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use kit_meta::{PackageManifest, RegistryConfig, parse_manifest};

use crate::{Error, Result};

pub const INDEX_PATH: &str = "index.yaml";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("kit-package-manager/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// Something that can return the text of a registry file by relative path.
pub trait ContentSource {
    fn fetch(&self, path: &str) -> Result<String>;
}

/// [`ContentSource`] reading through the GitHub contents API.
///
/// Each file costs two requests: the contents API entry, then the raw body
/// from its `download_url`.
pub struct GithubContentSource {
    client: Client,
    api_url: String,
    branch: Option<String>,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ContentEntry {
    #[serde(default)]
    download_url: Option<String>,
}

impl GithubContentSource {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            branch: None,
            token: None,
        })
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into()).filter(|b: &String| !b.is_empty());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn from_config(registry: &RegistryConfig) -> Result<Self> {
        let mut source = Self::new(registry.repo_content_api_url.clone())?
            .with_branch(registry.branch.clone());
        if let Some(token) = &registry.token {
            source = source.with_token(token.clone());
        }
        Ok(source)
    }

    /// Contents API URL for a registry-relative path.
    pub fn contents_url(&self, path: &str) -> String {
        let mut url = format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        if let Some(branch) = &self.branch {
            url.push_str("?ref=");
            url.push_str(branch);
        }
        url
    }

    fn get(&self, url: &str, accept: Option<&str>) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header("Accept", accept);
        }
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().map_err(|source| Error::Http {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response)
    }
}

impl ContentSource for GithubContentSource {
    fn fetch(&self, path: &str) -> Result<String> {
        let url = self.contents_url(path);
        tracing::debug!(url = %url, "Fetching registry file");

        let entry: ContentEntry = self
            .get(&url, Some(GITHUB_JSON))?
            .json()
            .map_err(|source| Error::Http {
                url: url.clone(),
                source,
            })?;

        let download_url = entry
            .download_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::MissingDownloadUrl {
                path: path.to_string(),
            })?;

        self.get(&download_url, None)?
            .text()
            .map_err(|source| Error::Http {
                url: download_url,
                source,
            })
    }
}

#[derive(Deserialize)]
struct Index {
    #[serde(default)]
    packages: Vec<String>,
}

/// A manifest left out of a fetch, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedManifest {
    pub path: String,
    pub reason: String,
}

/// Result of reading the whole registry.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub packages: Vec<PackageManifest>,
    pub skipped: Vec<SkippedManifest>,
}

/// Reads the index and manifests from a [`ContentSource`].
pub struct Fetcher<'a> {
    source: &'a dyn ContentSource,
}

impl<'a> Fetcher<'a> {
    pub fn new(source: &'a dyn ContentSource) -> Self {
        Self { source }
    }

    /// Manifest paths listed by the registry index.
    pub fn fetch_index(&self) -> Result<Vec<String>> {
        let content = self.source.fetch(INDEX_PATH)?;
        let index: Index = serde_yaml::from_str(&content).map_err(|e| Error::Index {
            message: e.to_string(),
        })?;

        let paths: Vec<String> = index
            .packages
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if paths.is_empty() {
            return Err(Error::EmptyIndex);
        }
        Ok(paths)
    }

    /// Fetch one manifest, check its name and derive its category.
    pub fn fetch_manifest(&self, path: &str) -> Result<PackageManifest> {
        let content = self.source.fetch(path)?;
        let mut manifest = parse_manifest(content.as_bytes()).map_err(|source| Error::Parse {
            path: path.to_string(),
            source,
        })?;

        if manifest.validate().is_err() {
            return Err(Error::EmptyName {
                path: path.to_string(),
            });
        }

        manifest.category = category_from_path(path);
        Ok(manifest)
    }

    /// Fetch every manifest in the index, skipping the ones that fail.
    ///
    /// Fails only when the index is unusable or no manifest succeeds.
    pub fn fetch_all(&self) -> Result<FetchOutcome> {
        let mut outcome = FetchOutcome::default();

        for path in self.fetch_index()? {
            match self.fetch_manifest(&path) {
                Ok(manifest) => outcome.packages.push(manifest),
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Skipping manifest");
                    outcome.skipped.push(SkippedManifest {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if outcome.packages.is_empty() {
            return Err(Error::NoPackages {
                skipped: outcome.skipped.len(),
            });
        }

        tracing::info!(
            loaded = outcome.packages.len(),
            skipped = outcome.skipped.len(),
            "Fetched registry"
        );
        Ok(outcome)
    }

    /// Fetch a single manifest by package name using the index file names.
    pub fn fetch_by_name(&self, name: &str) -> Result<PackageManifest> {
        let file_name = format!("{name}.yaml");
        let path = self
            .fetch_index()?
            .into_iter()
            .find(|p| p.rsplit('/').next() == Some(file_name.as_str()))
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })?;

        self.fetch_manifest(&path)
    }
}

/// Category of a manifest at `<root>/<category>/<file>`, if the path is that deep.
pub fn category_from_path(path: &str) -> Option<String> {
    let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    if parts.len() >= 3 {
        Some(parts[1].to_string()).filter(|c| !c.is_empty())
    } else {
        None
    }
}
