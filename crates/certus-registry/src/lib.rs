//! Certus Registry
//!
//! The persisted KYC verification state machine:
//! - identity records keyed by account, mutated only through approvals
//! - verifier grants maintained by the contract owner
//! - the pending-request queue with its global monotonic id counter
//! - the pause switch gating every mutating operation
//!
//! The host ledger delivers calls sequentially; each mutating operation
//! commits all of its writes as a single storage batch.

pub mod error;
pub mod records;
pub mod registry;
pub mod storage;

pub use error::RegistryError;
pub use records::{
    IdentityRecord, PendingRequest, Verification, VerifierGrant, MAX_METADATA_BYTES,
};
pub use registry::KycRegistry;
pub use storage::Storage;
