//! Shared test utilities for the kit workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures
//! - [`roots`]: [`TestRoots`], a temporary install layout with a valid config
//! - [`manifest`]: [`ManifestBuilder`] for package manifests

pub mod git;
pub mod manifest;
pub mod roots;

pub use manifest::ManifestBuilder;
pub use roots::TestRoots;
