//! Error types for the launcher metadata generator.
//!
//! Every failure in this crate represents a broken build input: there is no
//! recoverable tier. Each variant carries the path or coordinate that failed so
//! the invoking build step can surface it to the operator.

use crate::checksum::DigestError;
use crate::coordinate::ArtifactCoordinate;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Errors that can occur while generating update metadata.
#[derive(Debug, Error)]
pub enum MetaError {
    /// A file could not be read, written, copied, or removed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path of the file or directory involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No configured repository hosts the artifact.
    #[error("no configured repository hosts {coordinate}")]
    UnresolvedRepository {
        /// The coordinate that could not be resolved.
        coordinate: ArtifactCoordinate,
    },

    /// A repository could not be reached while probing for an artifact.
    #[error("could not probe {repository} for {coordinate}: {reason}")]
    ProbeFailed {
        /// The coordinate being resolved.
        coordinate: ArtifactCoordinate,
        /// Name of the unreachable repository.
        repository: String,
        /// Transport failure reported by the probe.
        reason: String,
    },

    /// A module archive was discovered without its generated metadata.
    #[error("module archive {archive} has no metadata document at {expected}")]
    MissingModuleMetadata {
        /// Path of the module archive.
        archive: Utf8PathBuf,
        /// Where the metadata document was expected.
        expected: Utf8PathBuf,
    },

    /// The requested digest algorithm is not available.
    #[error("unsupported digest algorithm \"{algorithm}\"; only SHA3-256 is available")]
    UnsupportedDigestAlgorithm {
        /// The rejected algorithm name.
        algorithm: String,
    },

    /// The generator configuration file is invalid.
    #[error("invalid configuration {path}: {reason}")]
    InvalidConfig {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A module metadata document could not be parsed.
    #[error("invalid module metadata {path}: {source}")]
    InvalidModuleMetadata {
        /// Path to the metadata document.
        path: Utf8PathBuf,
        /// The JSON parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The module registry document could not be parsed or serialized.
    #[error("invalid module registry {path}: {source}")]
    InvalidRegistry {
        /// Path to the registry document.
        path: Utf8PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The resolved dependency list supplied by the build tool is invalid.
    #[error("invalid dependency list {path}: {reason}")]
    InvalidDependencyList {
        /// Path to the dependency list.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// A digest value failed validation.
    #[error(transparent)]
    InvalidDigest(#[from] DigestError),

    /// A staged file no longer matches its recorded checksum.
    #[error("checksum mismatch for {key}: recorded {expected}, computed {actual}")]
    ChecksumMismatch {
        /// The checksum property key.
        key: String,
        /// The recorded digest.
        expected: String,
        /// The freshly computed digest.
        actual: String,
    },

    /// A checksum property file lacks a required key.
    #[error("checksum file {path} has no \"{key}\" entry")]
    MissingChecksum {
        /// Path to the checksum file.
        path: Utf8PathBuf,
        /// The missing key.
        key: String,
    },
}

impl MetaError {
    /// Wrap an I/O error with the path it occurred at.
    pub fn io(path: impl AsRef<Utf8Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_owned(),
            source,
        }
    }
}

/// Result type alias using [`MetaError`].
pub type Result<T> = std::result::Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_includes_path() {
        let err = MetaError::io(
            "build/libs/node.jar",
            std::io::Error::other("permission denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("build/libs/node.jar"));
        assert!(msg.contains("permission denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unresolved_repository_names_coordinate() {
        let err = MetaError::UnresolvedRepository {
            coordinate: ArtifactCoordinate::release("eu.example", "foo", "1.0"),
        };
        assert!(err.to_string().contains("eu.example:foo:1.0"));
    }

    #[test]
    fn missing_metadata_includes_both_paths() {
        let err = MetaError::MissingModuleMetadata {
            archive: Utf8PathBuf::from("bridge/build/libs/cloudnet-bridge.jar"),
            expected: Utf8PathBuf::from("bridge/build/generated/module-json/module.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cloudnet-bridge.jar"));
        assert!(msg.contains("module.json"));
    }

    #[test]
    fn unsupported_algorithm_names_algorithm() {
        let err = MetaError::UnsupportedDigestAlgorithm {
            algorithm: "MD5".to_owned(),
        };
        assert!(err.to_string().contains("MD5"));
    }

    #[test]
    fn checksum_mismatch_lists_both_digests() {
        let err = MetaError::ChecksumMismatch {
            key: "launcher".to_owned(),
            expected: "a".repeat(64),
            actual: "b".repeat(64),
        };
        let msg = err.to_string();
        assert!(msg.contains("launcher"));
        assert!(msg.contains(&"a".repeat(64)));
        assert!(msg.contains(&"b".repeat(64)));
    }
}
