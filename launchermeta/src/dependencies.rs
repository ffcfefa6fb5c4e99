//! Resolved runtime dependencies handed over by the build tool.
//!
//! Dependency resolution belongs to the build tool; this generator only reads
//! the result, a JSON array with one object per resolved artifact:
//!
//! ```json
//! [
//!   {
//!     "group": "io.netty",
//!     "name": "netty-buffer",
//!     "version": "4.1.100.Final",
//!     "file": "/home/ci/.gradle/caches/.../netty-buffer-4.1.100.Final.jar"
//!   }
//! ]
//! ```
//!
//! `resolvedVersion`, `classifier` and `extension` are optional.

use crate::coordinate::ArtifactCoordinate;
use crate::error::{MetaError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;

/// A resolved dependency and the local file holding its artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    /// Identity of the artifact.
    pub coordinate: ArtifactCoordinate,
    /// Local copy of the artifact, used for checksumming.
    pub file: Utf8PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DependencyRecord {
    group: String,
    name: String,
    version: String,
    #[serde(default)]
    resolved_version: Option<String>,
    #[serde(default)]
    classifier: Option<String>,
    #[serde(default)]
    extension: Option<String>,
    file: Utf8PathBuf,
}

impl From<DependencyRecord> for ResolvedDependency {
    fn from(record: DependencyRecord) -> Self {
        let coordinate = ArtifactCoordinate::new(
            record.group,
            record.name,
            record.version,
            record.resolved_version.as_deref(),
            record.classifier.as_deref(),
        );
        let coordinate = match record.extension {
            Some(extension) => coordinate.with_extension(extension),
            None => coordinate,
        };
        Self {
            coordinate,
            file: record.file,
        }
    }
}

/// Read the dependency list at `path`.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the file cannot be read and
/// [`MetaError::InvalidDependencyList`] if it is malformed, names an
/// artifact with an empty group, name or version, or any coordinate part
/// contains whitespace.
pub fn load_dependencies(path: &Utf8Path) -> Result<Vec<ResolvedDependency>> {
    let source = fs::read_to_string(path).map_err(|e| MetaError::io(path, e))?;
    parse_dependencies(path, &source)
}

/// Parse dependency list text; `path` is used in errors.
///
/// # Errors
///
/// See [`load_dependencies`].
pub fn parse_dependencies(path: &Utf8Path, source: &str) -> Result<Vec<ResolvedDependency>> {
    let records: Vec<DependencyRecord> =
        serde_json::from_str(source).map_err(|e| MetaError::InvalidDependencyList {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            check_record(&record).map_err(|reason| MetaError::InvalidDependencyList {
                path: path.to_owned(),
                reason: format!("entry {index} {reason}"),
            })?;
            Ok(ResolvedDependency::from(record))
        })
        .collect()
}

fn check_record(record: &DependencyRecord) -> std::result::Result<(), &'static str> {
    if ![&record.group, &record.name, &record.version]
        .iter()
        .all(|field| is_token(field))
    {
        return Err("must have a non-blank group, name and version without whitespace");
    }
    // Blank optional parts count as absent.
    let optional = [&record.resolved_version, &record.classifier, &record.extension];
    if optional
        .iter()
        .filter_map(|field| field.as_deref().map(str::trim))
        .any(|field| !field.is_empty() && !is_token(field))
    {
        return Err("has a resolved version, classifier or extension containing whitespace");
    }
    Ok(())
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && !value.contains(char::is_whitespace)
}
