//! SHA3-256 digest newtype.
//!
//! Validates that the value is a 64-character lowercase hexadecimal string
//! representing a 256-bit hash digest.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Expected length of a hex-encoded SHA3-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Errors arising from malformed digest strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// The value is not a 64-character lowercase hex string.
    #[error("invalid SHA3-256 digest \"{value}\": {reason}")]
    Malformed {
        /// The rejected value.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// A validated hex-encoded SHA3-256 digest string.
///
/// # Examples
///
/// ```
/// use launchermeta::checksum::Sha3Digest;
///
/// let hex = "a".repeat(64);
/// let digest: Sha3Digest = hex.as_str().try_into().unwrap();
/// assert_eq!(digest.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha3Digest(String);

impl Sha3Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex-encode raw digest output, two lower-case digits per byte.
    pub(crate) fn from_raw(bytes: &[u8]) -> Self {
        Self(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }
}

impl TryFrom<&str> for Sha3Digest {
    type Error = DigestError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_sha3(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Sha3Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_sha3(&value)?;
        Ok(Self(value))
    }
}

impl From<Sha3Digest> for String {
    fn from(digest: Sha3Digest) -> Self {
        digest.0
    }
}

impl AsRef<str> for Sha3Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha3Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_sha3(value: &str) -> Result<(), DigestError> {
    let reject = |reason: String| DigestError::Malformed {
        value: value.to_owned(),
        reason,
    };
    if value.len() != DIGEST_HEX_LEN {
        return Err(reject(format!(
            "expected {DIGEST_HEX_LEN} hex characters, got {}",
            value.len()
        )));
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(reject(format!("non-hex character '{bad}'")));
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(reject("digest must be lowercase".to_owned()));
    }
    Ok(())
}
