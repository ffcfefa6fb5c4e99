//! Generator configuration loaded from `launchermeta.toml`.
//!
//! The build supplies everything the generator needs (product identity,
//! repositories, module layout, staging layout) through this one file. The
//! loaded value is passed explicitly into each component call; nothing reads
//! ambient state.
//!
//! ```toml
//! [product]
//! name = "CloudNet"
//! codename = "Blizzard"
//! version = "4.0.0-RC10"
//! group = "eu.cloudnetservice.cloudnet"
//! ignored_groups = ["eu.cloudnetservice.ext"]
//!
//! [[repositories]]
//! name = "Central"
//! url = "https://repo1.maven.org/maven2/"
//! accepts = "releases"
//! ```
//!
//! Relative paths are resolved against the working directory of the
//! invoking build step.

use crate::checksum::DigestAlgorithm;
use crate::error::{MetaError, Result};
use crate::repository::{ProbeSettings, RepositoryDescriptor};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "launchermeta.toml";

/// Top-level generator configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Identity of the product being built.
    pub product: ProductInfo,
    /// Declared package repositories, in probe order.
    #[serde(default)]
    pub repositories: Vec<RepositoryDescriptor>,
    /// Digest algorithm name; only `SHA3-256` is supported.
    #[serde(default = "GeneratorConfig::default_digest_algorithm")]
    pub digest_algorithm: String,
    /// `digest_algorithm` parsed during validation.
    #[serde(skip)]
    algorithm: DigestAlgorithm,
    /// HTTP probe settings.
    #[serde(default)]
    pub probe: ProbeSettings,
    /// Module discovery and update-feed settings.
    #[serde(default)]
    pub modules: ModuleSettings,
    /// Self-update staging settings.
    #[serde(default)]
    pub staging: StagingSettings,
}

impl GeneratorConfig {
    fn default_digest_algorithm() -> String {
        DigestAlgorithm::Sha3_256.name().to_owned()
    }

    /// Load and validate the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::Io`] if the file cannot be read,
    /// [`MetaError::InvalidConfig`] if it cannot be parsed or fails
    /// validation, and [`MetaError::UnsupportedDigestAlgorithm`] if it names
    /// an algorithm other than SHA3-256.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| MetaError::io(path, e))?;
        Self::parse(path, &source)
    }

    /// Parse and validate configuration text; `path` is used in errors.
    ///
    /// # Errors
    ///
    /// See [`GeneratorConfig::load`].
    pub fn parse(path: &Utf8Path, source: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(source).map_err(|e| MetaError::InvalidConfig {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        config.algorithm = config.digest_algorithm.parse()?;
        config.validate(path)?;
        Ok(config)
    }

    /// The digest algorithm used for every checksum.
    #[must_use]
    pub const fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn validate(&self, path: &Utf8Path) -> Result<()> {
        let invalid = |reason: String| MetaError::InvalidConfig {
            path: path.to_owned(),
            reason,
        };

        for (field, value) in [
            ("product.name", &self.product.name),
            ("product.codename", &self.product.codename),
            ("product.version", &self.product.version),
            ("product.group", &self.product.group),
        ] {
            if !is_token(value) {
                return Err(invalid(format!(
                    "{field} must be a non-empty value without whitespace"
                )));
            }
        }

        let mut names = HashSet::new();
        for repository in &self.repositories {
            if !is_token(&repository.name) {
                return Err(invalid(format!(
                    "repository name \"{}\" must be non-empty and contain no whitespace",
                    repository.name
                )));
            }
            if !names.insert(repository.name.as_str()) {
                return Err(invalid(format!(
                    "repository \"{}\" is declared twice",
                    repository.name
                )));
            }
            if repository.has_credentials() {
                return Err(invalid(format!(
                    "repository \"{}\" embeds credentials; authenticated repositories are not supported",
                    repository.name
                )));
            }
        }
        Ok(())
    }
}

/// Identity of the product whose artifacts are described.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProductInfo {
    /// Product name, e.g. `CloudNet`.
    pub name: String,
    /// Release codename.
    pub codename: String,
    /// Product version.
    pub version: String,
    /// The product's own group id; its artifacts are trusted implicitly.
    pub group: String,
    /// Further groups whose artifacts are trusted implicitly.
    #[serde(default)]
    pub ignored_groups: Vec<String>,
}

/// Where modules are found and how they are published.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleSettings {
    /// Root of the module build output tree.
    pub output_dir: Utf8PathBuf,
    /// File name prefix of module archives.
    pub archive_prefix: String,
    /// File name suffix of module archives.
    pub archive_suffix: String,
    /// Directory, relative to a module project, holding its archive.
    pub archive_dir: Utf8PathBuf,
    /// Path, relative to a module project, of its generated metadata.
    pub metadata_path: Utf8PathBuf,
    /// Directory receiving copies of module archives for distribution.
    pub distribution_dir: Utf8PathBuf,
    /// The central module registry document.
    pub registry_path: Utf8PathBuf,
    /// Download URL template with `{repository}`, `{branch}` and `{file}`.
    pub download_url_template: String,
    /// Repository (`owner/name`) hosting the update feed.
    pub update_repository: String,
    /// Branch of the update feed.
    pub update_branch: String,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from("modules"),
            archive_prefix: "cloudnet-".to_owned(),
            archive_suffix: ".jar".to_owned(),
            archive_dir: Utf8PathBuf::from("build/libs"),
            metadata_path: Utf8PathBuf::from("build/generated/module-json/module.json"),
            distribution_dir: Utf8PathBuf::from(".launchermeta/modules"),
            registry_path: Utf8PathBuf::from(".launchermeta/modules.json"),
            download_url_template:
                "https://raw.githubusercontent.com/{repository}/{branch}/modules/{file}".to_owned(),
            update_repository: "CloudNetService/launchermeta".to_owned(),
            update_branch: "release".to_owned(),
        }
    }
}

/// Layout of the self-update staging directory.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StagingSettings {
    /// Staging directory, deleted and recreated on every run.
    pub directory: Utf8PathBuf,
    /// File name of the checksums property file.
    pub checksums_file: String,
    /// Staged file name of the core runtime.
    pub node_file: String,
    /// Staged file name of the launcher.
    pub launcher_file: String,
    /// Staged file name of the launcher patcher.
    pub launcher_patcher_file: String,
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            directory: Utf8PathBuf::from(".launchermeta/auto-updater"),
            checksums_file: "checksums.properties".to_owned(),
            node_file: "node.jar".to_owned(),
            launcher_file: "launcher.jar".to_owned(),
            launcher_patcher_file: "launcher-patcher.jar".to_owned(),
        }
    }
}

/// Whether `value` can be written as a single whitespace-delimited token.
fn is_token(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}
