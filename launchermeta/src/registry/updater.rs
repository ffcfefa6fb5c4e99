//! Registry maintenance for first-party modules.
//!
//! An update run describes every discovered module, merges the descriptors
//! into the existing registry document, writes it back and publishes the
//! archives next to it so that the download URLs resolve once the feed
//! repository is pushed.

use super::discovery::{DiscoveredModule, discover_modules};
use super::{ModuleDescriptor, ModuleRegistry};
use crate::checksum::{DigestAlgorithm, checksum_file_with};
use crate::config::{ModuleSettings, ProductInfo};
use crate::error::{MetaError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde_json::Map;
use std::fs;
use std::io;

/// Build the registry descriptor for a discovered module.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the archive cannot be read.
pub fn describe_module(
    module: &DiscoveredModule,
    settings: &ModuleSettings,
    product: &ProductInfo,
    algorithm: DigestAlgorithm,
) -> Result<ModuleDescriptor> {
    let checksum = checksum_file_with(algorithm, &module.archive)?;
    let metadata = &module.metadata;
    Ok(ModuleDescriptor {
        official: true,
        name: metadata.name.clone(),
        website: metadata.website.clone(),
        version: metadata.version.clone(),
        checksum: checksum.digest().clone(),
        description: metadata.description.clone(),
        download_url: download_url(settings, module.file_name()),
        maintainers: vec![metadata.author.clone()],
        release_notes: vec![format!(
            "Compatible with {} {}",
            product.name, product.version
        )],
        depending_modules: metadata.module_dependencies().map(str::to_owned).collect(),
        extra: Map::new(),
    })
}

/// Expand the configured download URL template for `file`.
#[must_use]
pub fn download_url(settings: &ModuleSettings, file: &str) -> String {
    settings
        .download_url_template
        .replace("{repository}", &settings.update_repository)
        .replace("{branch}", &settings.update_branch)
        .replace("{file}", file)
}

/// Load the registry at `path`; an absent file yields an empty registry.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the file exists but cannot be read and
/// [`MetaError::InvalidRegistry`] if it is not a valid registry document.
pub fn load_registry(path: &Utf8Path) -> Result<ModuleRegistry> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("no registry at {path}, starting empty");
            return Ok(ModuleRegistry::new());
        }
        Err(e) => return Err(MetaError::io(path, e)),
    };
    serde_json::from_str(&source).map_err(|source| MetaError::InvalidRegistry {
        path: path.to_owned(),
        source,
    })
}

/// Write `registry` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the directory or file cannot be written and
/// [`MetaError::InvalidRegistry`] if the registry cannot be serialized.
pub fn save_registry(path: &Utf8Path, registry: &ModuleRegistry) -> Result<()> {
    let mut json =
        serde_json::to_string_pretty(registry).map_err(|source| MetaError::InvalidRegistry {
            path: path.to_owned(),
            source,
        })?;
    json.push('\n');
    create_parent(path)?;
    fs::write(path, json).map_err(|e| MetaError::io(path, e))
}

/// Merge `descriptors` into `registry`, in order.
#[must_use]
pub fn merge_descriptors(
    mut registry: ModuleRegistry,
    descriptors: impl IntoIterator<Item = ModuleDescriptor>,
) -> ModuleRegistry {
    for descriptor in descriptors {
        let name = descriptor.name.clone();
        match registry.merge(descriptor) {
            Some(previous) => debug!("replaced {name} {}", previous.version),
            None => debug!("added {name}"),
        }
    }
    registry
}

/// Copy every module archive into `distribution_dir`.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the directory cannot be created or a copy
/// fails.
pub fn publish_archives(
    modules: &[DiscoveredModule],
    distribution_dir: &Utf8Path,
) -> Result<Vec<Utf8PathBuf>> {
    fs::create_dir_all(distribution_dir).map_err(|e| MetaError::io(distribution_dir, e))?;
    modules
        .iter()
        .map(|module| {
            let dest = distribution_dir.join(module.file_name());
            fs::copy(&module.archive, &dest).map_err(|e| MetaError::io(&module.archive, e))?;
            Ok(dest)
        })
        .collect()
}

/// Discover modules, refresh the registry document and publish the archives.
///
/// The registry is written before any archive is copied.
///
/// # Errors
///
/// Propagates discovery, checksum, registry and copy failures.
pub fn update_registry(
    settings: &ModuleSettings,
    product: &ProductInfo,
    algorithm: DigestAlgorithm,
) -> Result<ModuleRegistry> {
    let modules = discover_modules(settings)?;
    let descriptors = modules
        .iter()
        .map(|module| describe_module(module, settings, product, algorithm))
        .collect::<Result<Vec<_>>>()?;

    let registry = merge_descriptors(load_registry(&settings.registry_path)?, descriptors);
    save_registry(&settings.registry_path, &registry)?;
    publish_archives(&modules, &settings.distribution_dir)?;

    info!(
        "registry {} lists {} modules ({} built)",
        settings.registry_path,
        registry.len(),
        modules.len()
    );
    Ok(registry)
}

fn create_parent(path: &Utf8Path) -> Result<()> {
    match path.parent().filter(|p| !p.as_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| MetaError::io(parent, e)),
        None => Ok(()),
    }
}
