use serde::{Deserialize, Serialize};

use certus_core::{AccountId, Height, KycLevel};
use certus_registry::IdentityRecord;

/// How close to expiry a verification may get before it counts as a renewal
/// candidate, in height units.
pub const RENEWAL_WINDOW: Height = 1_440;

/// Point-in-time compliance view of a single user.
///
/// Users without an identity record project to an inactive, expired row at
/// level zero rather than an error, so batch reports always cover the full
/// input list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCompliance {
    /// The projected user.
    pub user: AccountId,
    /// Current tier; `None` for unverified or unregistered users.
    pub level: Option<KycLevel>,
    /// Whether the verification has lapsed (or never existed).
    pub is_expired: bool,
    /// Heights remaining until expiry, zero once lapsed.
    pub blocks_until_expiry: Height,
    /// The record's active flag; false for unregistered users.
    pub is_active: bool,
    /// Height of the last approval, if any.
    pub verified_at: Option<Height>,
    /// The last approving verifier, if any.
    pub verifier: Option<AccountId>,
}

impl UserCompliance {
    /// Project a user's record (or its absence) at the given height.
    pub fn project(user: AccountId, record: Option<&IdentityRecord>, now: Height) -> Self {
        match record {
            Some(record) => match &record.verification {
                Some(v) => Self {
                    user,
                    level: Some(v.level),
                    is_expired: v.expires_at <= now,
                    blocks_until_expiry: v.expires_at.saturating_sub(now),
                    is_active: record.is_active,
                    verified_at: Some(v.verified_at),
                    verifier: Some(v.verifier.clone()),
                },
                None => Self {
                    user,
                    level: None,
                    is_expired: true,
                    blocks_until_expiry: 0,
                    is_active: record.is_active,
                    verified_at: None,
                    verifier: None,
                },
            },
            None => Self {
                user,
                level: None,
                is_expired: true,
                blocks_until_expiry: 0,
                is_active: false,
                verified_at: None,
                verifier: None,
            },
        }
    }

    /// A compliant row: active, verified, and not expired.
    pub fn is_valid(&self) -> bool {
        self.is_active && !self.is_expired && self.level.is_some()
    }

    /// Whether the row is expired or inside the renewal window.
    pub fn needs_renewal(&self) -> bool {
        self.is_expired || self.blocks_until_expiry < RENEWAL_WINDOW
    }
}
