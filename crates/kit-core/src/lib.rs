//! Install-state reconciliation for kit
//!
//! This crate decides what to do with a package manifest given what is
//! already on disk, and does it:
//!
//! - **StateStore**: one `package.yaml` record per installed package
//! - **Reconciler**: install, update and remove, with per-file failures
//!   collected as warnings and step failures treated as fatal
//! - **Downloader**: fetches remote additional-config content
//!
//! # Architecture
//!
//! ```text
//!                  kit-cli
//!                     |
//!                 kit-core
//!                     |
//!        +------------+------------+
//!        |            |            |
//!     kit-fs       kit-git      kit-meta
//! ```

mod artifacts;
pub mod download;
pub mod error;
pub mod reconcile;
pub mod runner;
pub mod store;

pub use download::{Downloader, HttpDownloader, raw_content_url};
pub use error::{Error, Result};
pub use reconcile::{
    BuildDirPolicy, InstallOptions, InstallReport, PackageState, Reconciler, RemoveReport,
    UpdateCheck, UpdateOutcome,
};
pub use runner::run_steps;
pub use store::{RECORD_FILE, StateStore};
