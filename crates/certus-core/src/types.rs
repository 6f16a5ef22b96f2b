use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Height of the host ledger, used as the system clock.
pub type Height = u64;

/// Identifier of a pending verification request, allocated from the global
/// monotonic counter.
pub type RequestId = u64;

/// On-ledger account identity (participant, verifier, or owner).
///
/// Account ids are opaque to the registry but restricted to non-empty
/// ASCII-graphic strings of at most 128 bytes so they can be embedded in
/// storage keys without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

/// Maximum length of an account id in bytes.
pub const MAX_ACCOUNT_ID_BYTES: usize = 128;

impl AccountId {
    /// Create a new account id, validating the character set and length.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidAccountId("must not be empty".into()));
        }
        if id.len() > MAX_ACCOUNT_ID_BYTES {
            return Err(CoreError::InvalidAccountId(format!(
                "must be at most {} bytes, got {}",
                MAX_ACCOUNT_ID_BYTES,
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_graphic()) {
            return Err(CoreError::InvalidAccountId(format!(
                "must contain only printable ASCII without spaces, got: {}",
                id
            )));
        }
        Ok(Self(id))
    }

    /// Get the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// 32-byte BLAKE3 digest of an off-ledger document.
///
/// Only the digest is kept on-ledger; the document itself lives with the
/// external storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentHash([u8; 32]);

impl DocumentHash {
    /// Wrap an existing 32-byte digest.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidHash(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// Parse a digest from its 64-character hex form.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| CoreError::InvalidHash(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Compute the BLAKE3 digest of a document's contents.
    pub fn digest(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex form of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for DocumentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for DocumentHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Compliance tier. Higher tiers subsume lower ones for validity checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum KycLevel {
    /// Tier 1.
    Basic,
    /// Tier 2.
    Intermediate,
    /// Tier 3.
    Advanced,
}

impl KycLevel {
    /// Parse a numeric tier. Only 1, 2, and 3 are valid; 0 means unverified
    /// and is represented by the absence of a level, never by a variant.
    pub fn from_u8(value: u8) -> Result<Self, CoreError> {
        match value {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::Advanced),
            other => Err(CoreError::InvalidLevel(other)),
        }
    }

    /// Numeric form of the tier.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Basic => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
        }
    }

    /// How long an approval at this tier remains valid, in height units.
    ///
    /// The offsets are fixed integer constants of the protocol, not
    /// wall-clock durations.
    pub fn validity_window(self) -> Height {
        match self {
            Self::Basic => 8_760,
            Self::Intermediate => 26_280,
            Self::Advanced => 52_560,
        }
    }
}

impl fmt::Display for KycLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "Basic"),
            Self::Intermediate => write!(f, "Intermediate"),
            Self::Advanced => write!(f, "Advanced"),
        }
    }
}
