//! [`ManifestBuilder`] for package manifests used in tests.

use kit_meta::{AdditionalConfig, PackageManifest, Script, Source};

/// Fluent builder over [`PackageManifest`].
///
/// # Example
///
/// ```rust,no_run
/// use kit_test_utils::ManifestBuilder;
///
/// let manifest = ManifestBuilder::new("foo")
///     .version("1.0")
///     .step("touch built.bin")
///     .binary("built.bin")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    manifest: PackageManifest,
}

impl ManifestBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            manifest: PackageManifest {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.manifest.version = Some(version.to_string());
        self
    }

    pub fn commit(mut self, commit: &str) -> Self {
        self.manifest.commit = Some(commit.to_string());
        self
    }

    pub fn homepage(mut self, url: &str) -> Self {
        self.manifest.homepage = url.to_string();
        self
    }

    pub fn source(mut self, url: &str) -> Self {
        self.manifest.install.source = Some(Source {
            kind: "git".to_string(),
            url: url.to_string(),
            reference: String::new(),
        });
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.manifest
            .install
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn step(mut self, line: &str) -> Self {
        self.manifest.install.steps.push(line.to_string());
        self
    }

    pub fn binary(mut self, path: &str) -> Self {
        self.manifest.install.binaries.push(path.to_string());
        self
    }

    pub fn config(mut self, path: &str) -> Self {
        self.manifest.install.configs.push(path.to_string());
        self
    }

    pub fn man(mut self, path: &str) -> Self {
        self.manifest.install.man.push(path.to_string());
        self
    }

    pub fn additional_config(mut self, filename: &str, content: &str) -> Self {
        self.manifest.install.additional_config.push(AdditionalConfig {
            filename: filename.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn script(mut self, filename: &str, content: &str) -> Self {
        self.manifest.post_install.scripts.push(Script {
            filename: filename.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn build(self) -> PackageManifest {
        self.manifest
    }
}
