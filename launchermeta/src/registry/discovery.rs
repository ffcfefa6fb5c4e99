//! Module archive discovery.
//!
//! Module projects share one layout: the archive sits in `<project>/<archive_dir>`
//! and the metadata document generated by the same build sits at
//! `<project>/<metadata_path>`. Discovery walks the module output tree for
//! archives matching the configured prefix and suffix and pairs each with its
//! metadata. Secondary archives the build attaches next to the module, such as
//! `-sources` and `-javadoc` jars, are not modules.

use super::metadata::{ModuleMetadata, read_metadata};
use crate::config::ModuleSettings;
use crate::error::{MetaError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use walkdir::WalkDir;

/// Classifiers of secondary archives built next to a module archive.
const SECONDARY_CLASSIFIERS: &[&str] = &["sources", "javadoc", "test-fixtures"];

/// A built module archive together with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModule {
    /// Path of the module archive.
    pub archive: Utf8PathBuf,
    /// Path of the metadata document.
    pub metadata_path: Utf8PathBuf,
    /// The parsed metadata.
    pub metadata: ModuleMetadata,
}

impl DiscoveredModule {
    /// File name of the archive.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.archive.file_name().unwrap_or(self.archive.as_str())
    }
}

/// Find every module archive under `settings.output_dir`.
///
/// Results are ordered by archive path.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the tree cannot be walked,
/// [`MetaError::MissingModuleMetadata`] if an archive has no metadata
/// document, and [`MetaError::InvalidModuleMetadata`] if a document is
/// malformed.
pub fn discover_modules(settings: &ModuleSettings) -> Result<Vec<DiscoveredModule>> {
    let mut modules = Vec::new();
    for archive in find_archives(settings)? {
        let Some(project) = project_root(&archive, &settings.archive_dir) else {
            continue;
        };
        let metadata_path = project.join(&settings.metadata_path);
        if !metadata_path.is_file() {
            return Err(MetaError::MissingModuleMetadata {
                archive,
                expected: metadata_path,
            });
        }
        let metadata = read_metadata(&metadata_path)?;
        debug!("discovered module {} at {archive}", metadata.name);
        modules.push(DiscoveredModule {
            archive,
            metadata_path,
            metadata,
        });
    }
    Ok(modules)
}

fn find_archives(settings: &ModuleSettings) -> Result<Vec<Utf8PathBuf>> {
    let root = &settings.output_dir;
    let mut archives = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .and_then(Utf8Path::from_path)
                .map_or_else(|| root.clone(), Utf8Path::to_owned);
            MetaError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            warn!("skipping non UTF-8 path {}", entry.path().display());
            continue;
        };
        if is_module_archive(path, settings) {
            archives.push(path.to_owned());
        }
    }
    Ok(archives)
}

fn is_module_archive(path: &Utf8Path, settings: &ModuleSettings) -> bool {
    let Some(file_name) = path.file_name() else {
        return false;
    };
    let Some(stem) = file_name
        .strip_prefix(settings.archive_prefix.as_str())
        .and_then(|rest| rest.strip_suffix(settings.archive_suffix.as_str()))
        .filter(|stem| !stem.is_empty())
    else {
        return false;
    };
    if is_secondary(stem) {
        debug!("skipping secondary archive {path}");
        return false;
    }
    path.parent().is_some_and(|dir| dir.ends_with(&settings.archive_dir))
}

fn is_secondary(stem: &str) -> bool {
    SECONDARY_CLASSIFIERS.iter().any(|classifier| {
        stem.strip_suffix(classifier)
            .is_some_and(|rest| rest.ends_with('-'))
    })
}

/// The module project directory owning `archive`.
fn project_root(archive: &Utf8Path, archive_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let depth = archive_dir.components().count();
    archive
        .parent()
        .and_then(|dir| dir.ancestors().nth(depth))
        .map(Utf8Path::to_owned)
}
