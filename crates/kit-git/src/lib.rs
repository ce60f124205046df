//! VCS abstraction for kit
//!
//! "latest" installs track a moving git reference. This crate answers the two
//! questions the reconciler asks about such installs: which commit did the
//! build check out, and which commit does the upstream HEAD point at now.

pub mod clone;
pub mod error;
pub mod revision;

pub use clone::strip_clone_pins;
pub use error::{Error, Result};
pub use revision::{GitRevisions, RevisionSource, short_hash};
