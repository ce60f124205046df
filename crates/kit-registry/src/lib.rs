//! Registry access for kit
//!
//! Manifests live in a remote registry described by an `index.yaml`. Reading
//! the whole registry is slow, so the package list is kept in a local bincode
//! snapshot that stays valid for the configured update interval.
//!
//! - [`cache`]: the local snapshot and its freshness contract
//! - [`fetch`]: the remote index and manifest reader
//! - [`Registry`]: cache-then-fetch for callers that only want packages

pub mod cache;
pub mod error;
pub mod fetch;
mod registry;

pub use cache::{CacheLookup, MissReason, RegistryCache};
pub use error::{Error, Result};
pub use fetch::{ContentSource, FetchOutcome, Fetcher, GithubContentSource, SkippedManifest};
pub use registry::Registry;
