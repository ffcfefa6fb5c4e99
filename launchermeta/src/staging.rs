//! Self-update staging.
//!
//! The launcher's self-updater reads a flat directory containing the core
//! runtime, the launcher and the launcher patcher under fixed names, plus a
//! `checksums.properties` file listing their SHA3-256 digests and that of the
//! module registry. The directory is rebuilt from scratch on every run so a
//! stale binary can never be served.

use crate::checksum::{ChecksumRecord, DigestAlgorithm, checksum_file_with};
use crate::config::{ProductInfo, StagingSettings};
use crate::error::{MetaError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::io;

/// Property key of the core runtime.
pub const NODE_KEY: &str = "node";
/// Property key of the launcher.
pub const LAUNCHER_KEY: &str = "launcher";
/// Property key of the launcher patcher.
pub const LAUNCHER_PATCHER_KEY: &str = "launcher-patcher";
/// Property key of the module registry.
pub const MODULES_JSON_KEY: &str = "modules-json";

/// Build outputs to stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingInputs {
    /// The built core runtime.
    pub node: Utf8PathBuf,
    /// The built launcher.
    pub launcher: Utf8PathBuf,
    /// The built launcher patcher.
    pub launcher_patcher: Utf8PathBuf,
    /// The module registry document.
    pub registry: Utf8PathBuf,
}

/// Checksums published alongside the staged binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateChecksumSet {
    /// Core runtime checksum.
    pub node: ChecksumRecord,
    /// Launcher checksum.
    pub launcher: ChecksumRecord,
    /// Launcher patcher checksum.
    pub launcher_patcher: ChecksumRecord,
    /// Module registry checksum.
    pub modules_json: ChecksumRecord,
}

impl UpdateChecksumSet {
    /// Entries in file order, keyed by property name.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &ChecksumRecord); 4] {
        [
            (NODE_KEY, &self.node),
            (LAUNCHER_KEY, &self.launcher),
            (LAUNCHER_PATCHER_KEY, &self.launcher_patcher),
            (MODULES_JSON_KEY, &self.modules_json),
        ]
    }

    /// Render the property file, headed by the product name and version.
    #[must_use]
    pub fn render(&self, product: &ProductInfo) -> String {
        let mut out = format!("# Checksums for {} {}\n", product.name, product.version);
        for (key, record) in self.entries() {
            out.push_str(&format!("{key}={record}\n"));
        }
        out
    }
}

/// Rebuild the staging directory from `inputs`.
///
/// Returns the checksums written to the property file.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the directory cannot be reset or a file cannot
/// be copied, read, or written.
pub fn prepare_staging(
    inputs: &StagingInputs,
    settings: &StagingSettings,
    product: &ProductInfo,
    algorithm: DigestAlgorithm,
) -> Result<UpdateChecksumSet> {
    let dir = &settings.directory;
    reset_dir(dir)?;

    let stage = |source: &Utf8Path, name: &str| stage_file(source, &dir.join(name), algorithm);
    let checksums = UpdateChecksumSet {
        node: stage(&inputs.node, &settings.node_file)?,
        launcher: stage(&inputs.launcher, &settings.launcher_file)?,
        launcher_patcher: stage(&inputs.launcher_patcher, &settings.launcher_patcher_file)?,
        modules_json: checksum_file_with(algorithm, &inputs.registry)?,
    };

    let properties = dir.join(&settings.checksums_file);
    fs::write(&properties, checksums.render(product)).map_err(|e| MetaError::io(&properties, e))?;
    info!("staged {} {} into {dir}", product.name, product.version);
    Ok(checksums)
}

/// Parse a checksum property file into key/value pairs.
///
/// Lines starting with `#` or `!` and blank lines are skipped. Values are
/// trimmed.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the file cannot be read.
pub fn read_checksums(path: &Utf8Path) -> Result<HashMap<String, String>> {
    let source = fs::read_to_string(path).map_err(|e| MetaError::io(path, e))?;
    Ok(parse_properties(&source))
}

/// Recompute the staged checksums and compare them with the property file.
///
/// # Errors
///
/// Returns [`MetaError::MissingChecksum`] if a key is absent,
/// [`MetaError::ChecksumMismatch`] for the first differing entry, and
/// [`MetaError::Io`] if a file cannot be read.
pub fn verify_staging(
    settings: &StagingSettings,
    registry: &Utf8Path,
    algorithm: DigestAlgorithm,
) -> Result<()> {
    let dir = &settings.directory;
    let properties = dir.join(&settings.checksums_file);
    let recorded = read_checksums(&properties)?;

    let staged = [
        (NODE_KEY, dir.join(&settings.node_file)),
        (LAUNCHER_KEY, dir.join(&settings.launcher_file)),
        (LAUNCHER_PATCHER_KEY, dir.join(&settings.launcher_patcher_file)),
        (MODULES_JSON_KEY, registry.to_owned()),
    ];
    for (key, path) in staged {
        let expected = recorded
            .get(key)
            .ok_or_else(|| MetaError::MissingChecksum {
                path: properties.clone(),
                key: key.to_owned(),
            })?;
        let actual = checksum_file_with(algorithm, &path)?;
        if !expected.eq_ignore_ascii_case(actual.hex()) {
            return Err(MetaError::ChecksumMismatch {
                key: key.to_owned(),
                expected: expected.clone(),
                actual: actual.hex().to_owned(),
            });
        }
        debug!("{key} matches {path}");
    }
    Ok(())
}

fn reset_dir(dir: &Utf8Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(MetaError::io(dir, e)),
    }
    fs::create_dir_all(dir).map_err(|e| MetaError::io(dir, e))
}

fn stage_file(
    source: &Utf8Path,
    dest: &Utf8Path,
    algorithm: DigestAlgorithm,
) -> Result<ChecksumRecord> {
    fs::copy(source, dest).map_err(|e| MetaError::io(source, e))?;
    debug!("copied {source} to {dest}");
    checksum_file_with(algorithm, dest)
}

fn parse_properties(source: &str) -> HashMap<String, String> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect()
}
