//! Per-module metadata documents.
//!
//! Each module build writes a JSON document describing the module. Only the
//! fields the registry needs are read; everything else is ignored.

use crate::error::{MetaError, Result};
use camino::Utf8Path;
use serde::Deserialize;
use std::fs;

/// Metadata written by a module's own build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleMetadata {
    /// Module name, unique across the registry.
    pub name: String,
    /// Project website.
    pub website: String,
    /// Module version.
    pub version: String,
    /// Human-readable description.
    pub description: String,
    /// Author, published as the sole maintainer.
    pub author: String,
    /// Modules and libraries this module depends on.
    #[serde(default)]
    pub dependencies: Vec<ModuleDependency>,
}

impl ModuleMetadata {
    /// Names of dependencies that are other first-party modules.
    ///
    /// A dependency fetched from an external repository is a library, not a
    /// module, and is left out.
    pub fn module_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .filter(|dependency| dependency.is_module())
            .map(|dependency| dependency.name.as_str())
    }
}

/// A dependency declared in module metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleDependency {
    /// Dependency name.
    pub name: String,
    /// External repository the dependency is fetched from, if any.
    #[serde(default)]
    pub repo: Option<String>,
}

impl ModuleDependency {
    /// Whether this names another first-party module.
    #[must_use]
    pub fn is_module(&self) -> bool {
        self.repo.as_deref().is_none_or(|repo| repo.trim().is_empty())
    }
}

/// Read and parse the metadata document at `path`.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the file cannot be read and
/// [`MetaError::InvalidModuleMetadata`] if it is not a valid document.
pub fn read_metadata(path: &Utf8Path) -> Result<ModuleMetadata> {
    let source = fs::read_to_string(path).map_err(|e| MetaError::io(path, e))?;
    serde_json::from_str(&source).map_err(|source| MetaError::InvalidModuleMetadata {
        path: path.to_owned(),
        source,
    })
}
