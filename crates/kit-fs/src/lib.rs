//! Filesystem primitives for kit
//!
//! Provides atomic writes, format-agnostic config loading and the small set of
//! file operations the installer needs (copy, chmod, best-effort removal).

pub mod config;
pub mod error;
pub mod io;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::{EXECUTABLE_MODE, validate_path_identifier};
