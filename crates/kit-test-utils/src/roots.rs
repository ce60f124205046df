//! [`TestRoots`]: an isolated install layout for one test.

use std::fs;
use std::path::{Path, PathBuf};

use kit_meta::Config;
use tempfile::TempDir;

/// A temporary base directory with a [`Config`] whose paths all live inside it.
///
/// The managed directories are not created up front; the code under test is
/// expected to create what it needs.
pub struct TestRoots {
    temp_dir: TempDir,
    /// Configuration pointing at `<temp>/kit`
    pub config: Config,
}

impl Default for TestRoots {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRoots {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::with_base(&temp_dir.path().join("kit"));
        Self { temp_dir, config }
    }

    /// Keep build directories after install.
    pub fn keep_build(mut self) -> Self {
        self.config.options.cleanup_build = false;
        self
    }

    /// Root of the temporary directory (parent of the kit base).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn bin(&self) -> &Path {
        &self.config.paths.bin
    }

    pub fn configs(&self) -> &Path {
        &self.config.paths.configs
    }

    pub fn man(&self) -> &Path {
        &self.config.paths.man
    }

    pub fn build(&self) -> &Path {
        &self.config.paths.build
    }

    pub fn registry(&self) -> &Path {
        &self.config.paths.registry
    }

    /// Write the configuration as `<temp>/config.yaml` and return its path.
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn write_config(&self) -> PathBuf {
        let path = self.root().join("config.yaml");
        self.config
            .save(&path)
            .unwrap_or_else(|e| panic!("TestRoots::write_config: {e}"));
        path
    }

    /// Create a scratch directory outside the kit base.
    pub fn scratch(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Assert that `path` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, path: &Path) {
        assert!(path.exists(), "Expected path to exist: {}", path.display());
    }

    /// Assert that `path` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, path: &Path) {
        assert!(
            !path.exists(),
            "Expected path NOT to exist: {}",
            path.display()
        );
    }
}
