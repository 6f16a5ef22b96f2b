use serde::{Deserialize, Serialize};

use certus_core::{AccountId, DocumentHash, Height, KycLevel};

/// Maximum length of request metadata in bytes.
pub const MAX_METADATA_BYTES: usize = 256;

/// A participant's on-ledger KYC record.
///
/// Created once at registration, mutated only by successful approvals, and
/// never deleted; deactivation is the `is_active` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Height at which the identity was registered.
    pub registered_at: Height,
    /// Digest of the most recently attached supporting document.
    pub document_hash: DocumentHash,
    /// Deactivation flag. No operation clears it yet; invalid when false.
    pub is_active: bool,
    /// Approval details; `None` until the first approval succeeds.
    pub verification: Option<Verification>,
}

impl IdentityRecord {
    /// Fresh unverified record.
    pub fn new(registered_at: Height, document_hash: DocumentHash) -> Self {
        Self {
            registered_at,
            document_hash,
            is_active: true,
            verification: None,
        }
    }

    /// Numeric tier of the record, 0 when unverified.
    pub fn level(&self) -> u8 {
        self.verification.as_ref().map_or(0, |v| v.level.as_u8())
    }

    /// Whether the record satisfies `min_level` at the given height:
    /// active, verified at or above the tier, and not yet expired.
    pub fn is_valid_for(&self, min_level: KycLevel, now: Height) -> bool {
        match &self.verification {
            Some(v) => self.is_active && v.level >= min_level && v.expires_at > now,
            None => false,
        }
    }
}

/// Approval details attached to an identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Tier granted by the approval.
    pub level: KycLevel,
    /// Height at which the approval happened.
    pub verified_at: Height,
    /// The approving verifier.
    pub verifier: AccountId,
    /// Height at which the approval stops being valid.
    pub expires_at: Height,
}

/// A verifier's authorization, granted by the contract owner.
///
/// Re-authorization overwrites in place; there is no removal operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierGrant {
    /// Highest tier this verifier may approve.
    pub max_level: KycLevel,
    /// Height of the most recent authorization.
    pub authorized_at: Height,
    /// The owner account that issued the grant.
    pub authorized_by: AccountId,
    /// Whether the grant is currently active.
    pub is_active: bool,
}

impl VerifierGrant {
    /// Whether this grant allows approving a request at `level`.
    /// A grant at tier k covers every tier up to and including k.
    pub fn covers(&self, level: KycLevel) -> bool {
        self.is_active && self.max_level >= level
    }
}

/// An unresolved verification request.
///
/// Requests never expire on their own and have no reject or cancel surface;
/// they persist until an approval deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Tier the user is asking for.
    pub requested_level: KycLevel,
    /// Digest of the supporting document for this request.
    pub document_hash: DocumentHash,
    /// Height at which the request was submitted.
    pub submitted_at: Height,
    /// Free-form caller-supplied context, at most [`MAX_METADATA_BYTES`].
    pub metadata: String,
}
