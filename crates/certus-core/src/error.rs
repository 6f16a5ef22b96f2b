/// Stable numeric error codes surfaced to ledger clients.
///
/// Callers match on these numbers, so they must never be renumbered.
pub mod codes {
    /// Caller is not allowed to perform the operation, or the registry is paused.
    pub const UNAUTHORIZED: u32 = 100;
    /// The account already holds an identity record.
    pub const ALREADY_REGISTERED: u32 = 101;
    /// A required record does not exist.
    pub const NOT_FOUND: u32 = 102;
    /// A verification level outside the valid 1..=3 range.
    pub const INVALID_LEVEL: u32 = 103;

    // Reserved for future surface; no current operation returns these.
    pub const ALREADY_VERIFIED: u32 = 104;
    pub const INSUFFICIENT_LEVEL: u32 = 105;
    pub const EXPIRED: u32 = 106;
}

/// Core validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid verification level: {0} (expected 1..=3)")]
    InvalidLevel(u8),

    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("invalid document hash: {0}")]
    InvalidHash(String),
}

impl CoreError {
    /// Stable numeric code for this error, if it has one.
    ///
    /// Malformed-input errors the host would reject at the type level carry
    /// no code.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::InvalidLevel(_) => Some(codes::INVALID_LEVEL),
            Self::InvalidAccountId(_) | Self::InvalidHash(_) => None,
        }
    }
}
