//! Checksum engine shared by every generator component.
//!
//! Files are streamed through SHA3-256 in fixed-size chunks so that
//! multi-megabyte runtime jars are never buffered whole. Digests are computed
//! fresh on every run; nothing is cached between invocations.

mod digest;

pub use digest::{DIGEST_HEX_LEN, DigestError, Sha3Digest};

use crate::error::{MetaError, Result};
use camino::Utf8Path;
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::fs;
use std::io::Read;
use std::str::FromStr;

const READ_CHUNK: usize = 8192;

/// Digest algorithms understood by the generator.
///
/// The update clients only verify SHA3-256, so that is the sole variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA3-256 as standardised in FIPS 202.
    #[default]
    Sha3_256,
}

impl DigestAlgorithm {
    /// Canonical algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha3_256 => "SHA3-256",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = MetaError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SHA3-256" | "SHA3_256" => Ok(Self::Sha3_256),
            _ => Err(MetaError::UnsupportedDigestAlgorithm {
                algorithm: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A digest together with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChecksumRecord {
    algorithm: DigestAlgorithm,
    digest: Sha3Digest,
}

impl ChecksumRecord {
    /// Create a record from an already validated digest.
    #[must_use]
    pub const fn new(algorithm: DigestAlgorithm, digest: Sha3Digest) -> Self {
        Self { algorithm, digest }
    }

    /// The algorithm used.
    #[must_use]
    pub const fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// The digest value.
    #[must_use]
    pub const fn digest(&self) -> &Sha3Digest {
        &self.digest
    }

    /// Lower-case hex form of the digest.
    #[must_use]
    pub fn hex(&self) -> &str {
        self.digest.as_str()
    }
}

impl fmt::Display for ChecksumRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.digest, f)
    }
}

/// Compute the SHA3-256 checksum of the file at `path`.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the file cannot be opened or read.
pub fn checksum_file(path: &Utf8Path) -> Result<ChecksumRecord> {
    checksum_file_with(DigestAlgorithm::Sha3_256, path)
}

/// Compute the checksum of the file at `path` using `algorithm`.
///
/// # Errors
///
/// Returns [`MetaError::Io`] if the file cannot be opened or read.
pub fn checksum_file_with(algorithm: DigestAlgorithm, path: &Utf8Path) -> Result<ChecksumRecord> {
    let file = fs::File::open(path).map_err(|e| MetaError::io(path, e))?;
    let digest = match algorithm {
        DigestAlgorithm::Sha3_256 => hash_reader::<Sha3_256>(file, path)?,
    };
    Ok(ChecksumRecord::new(algorithm, digest))
}

/// Compute the SHA3-256 checksum of an in-memory buffer.
#[must_use]
pub fn checksum_bytes(bytes: &[u8]) -> ChecksumRecord {
    let digest = Sha3Digest::from_raw(&Sha3_256::digest(bytes));
    ChecksumRecord::new(DigestAlgorithm::Sha3_256, digest)
}

fn hash_reader<D: Digest>(mut reader: impl Read, path: &Utf8Path) -> Result<Sha3Digest> {
    let mut hasher = D::new();
    let mut buffer = [0u8; READ_CHUNK];
    loop {
        let read = reader.read(&mut buffer).map_err(|e| MetaError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(Sha3Digest::from_raw(&hasher.finalize()))
}
