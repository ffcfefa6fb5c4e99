//! CNL trust manifest export.
//!
//! The runtime's first-launch dependency installer reads a line-based,
//! whitespace-delimited document so that it can be parsed without any
//! document-format library:
//!
//! ```text
//! # CloudNet Blizzard 4.0.0
//!
//! # repositories
//! repo Central https://repo1.maven.org/maven2
//!
//! # dependencies
//! include Central io.netty netty-buffer 4.1.100.Final 4.1.100.Final <sha3-256>
//! ```
//!
//! Every `include` names a repository declared by a preceding `repo` line.
//! All dependencies are resolved and checksummed before any text is produced,
//! so a failure never leaves a partial manifest behind.

use crate::checksum::{ChecksumRecord, DigestAlgorithm, checksum_file_with};
use crate::config::ProductInfo;
use crate::dependencies::ResolvedDependency;
use crate::error::{MetaError, Result};
use crate::repository::{RepositoryDescriptor, RepositoryResolver};
use camino::Utf8Path;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;
use std::fs;

/// Inputs for [`export_manifest`].
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    /// Product identity, own group and ignored groups.
    pub product: &'a ProductInfo,
    /// Declared repositories, in probe order.
    pub repositories: &'a [RepositoryDescriptor],
    /// Resolved runtime dependencies.
    pub dependencies: &'a [ResolvedDependency],
    /// Algorithm used to checksum the local artifacts.
    pub algorithm: DigestAlgorithm,
}

/// One trusted dependency in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Name of the repository hosting the artifact.
    pub repository: String,
    /// Group id.
    pub group: String,
    /// Artifact name.
    pub name: String,
    /// Version requested by the build.
    pub declared_version: String,
    /// Exact version that was verified.
    pub resolved_version: String,
    /// Checksum of the verified artifact.
    pub checksum: ChecksumRecord,
    /// Optional classifier.
    pub classifier: Option<String>,
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "include {} {} {} {} {} {} {}",
            self.repository,
            self.group,
            self.name,
            self.declared_version,
            self.resolved_version,
            self.checksum,
            self.classifier.as_deref().unwrap_or_default()
        )
    }
}

/// Whether artifacts of `group` are part of the product and trusted
/// implicitly.
#[must_use]
pub fn is_trusted_group(product: &ProductInfo, group: &str) -> bool {
    product.group == group || product.ignored_groups.iter().any(|g| g == group)
}

/// Resolve and checksum every third-party dependency.
///
/// Dependencies in the product's own or ignored groups are skipped, as are
/// repeated coordinates.
///
/// # Errors
///
/// Returns [`MetaError::UnresolvedRepository`] when a dependency is not
/// hosted by any declared repository and [`MetaError::Io`] when its local
/// artifact cannot be read.
pub fn collect_entries(
    request: &ExportRequest<'_>,
    resolver: &RepositoryResolver<'_>,
) -> Result<Vec<ManifestEntry>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for dependency in request.dependencies {
        let coordinate = &dependency.coordinate;
        if is_trusted_group(request.product, coordinate.group()) {
            debug!("skipping product artifact {coordinate}");
            continue;
        }
        if !seen.insert((coordinate.group(), coordinate.name(), coordinate.classifier())) {
            debug!("skipping duplicate {coordinate}");
            continue;
        }
        let repository = resolver.resolve(coordinate, request.repositories)?;
        let checksum = checksum_file_with(request.algorithm, &dependency.file)?;
        entries.push(ManifestEntry {
            repository: repository.name.clone(),
            group: coordinate.group().to_owned(),
            name: coordinate.name().to_owned(),
            declared_version: coordinate.version().to_owned(),
            resolved_version: coordinate.resolved_version().to_owned(),
            checksum,
            classifier: coordinate.classifier().map(str::to_owned),
        });
    }
    Ok(entries)
}

/// Build the complete CNL manifest text.
///
/// # Errors
///
/// See [`collect_entries`].
pub fn export_manifest(
    request: &ExportRequest<'_>,
    resolver: &RepositoryResolver<'_>,
) -> Result<String> {
    let entries = collect_entries(request, resolver)?;
    info!(
        "trusting {} dependencies across {} repositories",
        entries.len(),
        request.repositories.len()
    );
    Ok(render(request.product, request.repositories, &entries))
}

/// Write manifest text to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the directory or file cannot be written.
pub fn write_manifest(path: &Utf8Path, manifest: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MetaError::io(parent, e))?;
    }
    fs::write(path, manifest).map_err(|e| MetaError::io(path, e))
}

fn render(
    product: &ProductInfo,
    repositories: &[RepositoryDescriptor],
    entries: &[ManifestEntry],
) -> String {
    let mut lines = vec![
        format!("# {} {} {}", product.name, product.codename, product.version),
        String::new(),
        "# repositories".to_owned(),
    ];
    lines.extend(
        repositories
            .iter()
            .map(|repository| format!("repo {} {}", repository.name, repository.base_url())),
    );
    lines.push(String::new());
    lines.push("# dependencies".to_owned());
    lines.extend(entries.iter().map(ToString::to_string));

    let mut manifest = lines.join("\n");
    manifest.push('\n');
    manifest
}
