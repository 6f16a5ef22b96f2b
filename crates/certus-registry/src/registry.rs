//! The verification state machine over persistent storage.
//!
//! All mutating operations are gated by the pause switch and commit their
//! writes as one atomic batch. The host ledger delivers calls one at a time
//! in a single total order, so the registry performs no locking of its own.

use std::path::Path;
use std::sync::Arc;

use certus_core::{AccountId, ClockSource, DocumentHash, Height, KycLevel, RequestId};

use crate::error::RegistryError;
use crate::records::{
    IdentityRecord, PendingRequest, Verification, VerifierGrant, MAX_METADATA_BYTES,
};
use crate::storage::{
    request_key, Storage, CF_IDENTITIES, CF_REQUESTS, CF_STATE, CF_VERIFIERS, KEY_NEXT_REQUEST_ID,
    KEY_PAUSED,
};

/// Request ids start at 1; 0 is never allocated.
const FIRST_REQUEST_ID: RequestId = 1;

/// The on-ledger KYC registry.
///
/// The owner is fixed when the registry is opened and never changes, mirroring
/// the owner-is-deployer pattern of the hosting ledger.
pub struct KycRegistry {
    storage: Storage,
    owner: AccountId,
    clock: Arc<dyn ClockSource>,
}

impl KycRegistry {
    /// Open the registry at `path`, seeding the scalar state on first use.
    pub fn open(
        path: &Path,
        owner: AccountId,
        clock: Arc<dyn ClockSource>,
    ) -> Result<Self, RegistryError> {
        let storage = Storage::open(path)?;

        if storage
            .get::<RequestId>(CF_STATE, KEY_NEXT_REQUEST_ID)?
            .is_none()
        {
            let mut batch = storage.batch();
            batch.put(CF_STATE, KEY_NEXT_REQUEST_ID, &FIRST_REQUEST_ID)?;
            batch.put(CF_STATE, KEY_PAUSED, &false)?;
            batch.commit()?;
        }

        tracing::debug!(owner = %owner, "opened kyc registry");

        Ok(Self {
            storage,
            owner,
            clock,
        })
    }

    /// The fixed owner account.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Current height as reported by the host chain.
    pub fn current_height(&self) -> Height {
        self.clock.height()
    }

    // ---------------------------------------------------------------------
    // Mutating operations
    // ---------------------------------------------------------------------

    /// Register a new identity for `caller` at level 0.
    pub fn register(
        &self,
        caller: &AccountId,
        document_hash: DocumentHash,
    ) -> Result<(), RegistryError> {
        self.ensure_active()?;

        if self.identity(caller)?.is_some() {
            return Err(RegistryError::AlreadyRegistered);
        }

        let record = IdentityRecord::new(self.clock.height(), document_hash);

        let mut batch = self.storage.batch();
        batch.put(CF_IDENTITIES, caller.as_str().as_bytes(), &record)?;
        batch.commit()?;

        tracing::info!(user = %caller, height = record.registered_at, "registered identity");
        Ok(())
    }

    /// Submit a verification request for `caller`, returning the allocated id.
    ///
    /// Level validity is enforced at the boundary by [`KycLevel`]; a numeric
    /// tier outside 1..=3 never reaches this method.
    pub fn submit_request(
        &self,
        caller: &AccountId,
        requested_level: KycLevel,
        document_hash: DocumentHash,
        metadata: &str,
    ) -> Result<RequestId, RegistryError> {
        self.ensure_active()?;

        if metadata.len() > MAX_METADATA_BYTES {
            return Err(RegistryError::MetadataTooLong {
                len: metadata.len(),
            });
        }
        if self.identity(caller)?.is_none() {
            return Err(RegistryError::NotFound);
        }

        let request_id = self.next_request_id()?;
        let request = PendingRequest {
            requested_level,
            document_hash,
            submitted_at: self.clock.height(),
            metadata: metadata.to_string(),
        };

        let mut batch = self.storage.batch();
        batch.put(CF_REQUESTS, &request_key(caller, request_id), &request)?;
        batch.put(CF_STATE, KEY_NEXT_REQUEST_ID, &(request_id + 1))?;
        batch.commit()?;

        tracing::info!(
            user = %caller,
            request_id,
            level = %requested_level,
            "submitted verification request"
        );
        Ok(request_id)
    }

    /// Approve the pending request `(user, request_id)` as `caller`.
    ///
    /// The caller's grant must cover the requested level. On success the
    /// identity record takes the requested level, the request's document
    /// hash, and a fresh expiry, and the request is deleted; both writes land
    /// in the same batch.
    pub fn approve(
        &self,
        caller: &AccountId,
        user: &AccountId,
        request_id: RequestId,
    ) -> Result<(), RegistryError> {
        self.ensure_active()?;

        let request = self
            .pending_request(user, request_id)?
            .ok_or(RegistryError::NotFound)?;

        if !self.can_verify_level(caller, request.requested_level)? {
            return Err(RegistryError::Unauthorized);
        }

        // Submission requires an identity record, so this lookup cannot miss
        // unless storage was tampered with; check anyway.
        let mut record = self.identity(user)?.ok_or(RegistryError::NotFound)?;

        let now = self.clock.height();
        let expires_at = now + request.requested_level.validity_window();
        record.verification = Some(Verification {
            level: request.requested_level,
            verified_at: now,
            verifier: caller.clone(),
            expires_at,
        });
        record.document_hash = request.document_hash;

        let mut batch = self.storage.batch();
        batch.put(CF_IDENTITIES, user.as_str().as_bytes(), &record)?;
        batch.delete(CF_REQUESTS, &request_key(user, request_id))?;
        batch.commit()?;

        tracing::info!(
            user = %user,
            verifier = %caller,
            request_id,
            level = %request.requested_level,
            expires_at,
            "approved verification"
        );
        Ok(())
    }

    /// Grant or refresh a verifier's authorization. Owner only.
    ///
    /// Overwrites any prior grant for `verifier`, so re-authorization simply
    /// updates the maximum level and the authorization height.
    pub fn authorize_verifier(
        &self,
        caller: &AccountId,
        verifier: &AccountId,
        max_level: KycLevel,
    ) -> Result<(), RegistryError> {
        self.ensure_active()?;

        if caller != &self.owner {
            return Err(RegistryError::Unauthorized);
        }

        let grant = VerifierGrant {
            max_level,
            authorized_at: self.clock.height(),
            authorized_by: caller.clone(),
            is_active: true,
        };

        let mut batch = self.storage.batch();
        batch.put(CF_VERIFIERS, verifier.as_str().as_bytes(), &grant)?;
        batch.commit()?;

        tracing::info!(verifier = %verifier, max_level = %max_level, "authorized verifier");
        Ok(())
    }

    /// Flip the pause switch. Owner only.
    ///
    /// Deliberately not gated by the switch itself: the owner must always be
    /// able to unpause.
    pub fn set_paused(&self, caller: &AccountId, paused: bool) -> Result<(), RegistryError> {
        if caller != &self.owner {
            return Err(RegistryError::Unauthorized);
        }

        let mut batch = self.storage.batch();
        batch.put(CF_STATE, KEY_PAUSED, &paused)?;
        batch.commit()?;

        tracing::info!(paused, "updated pause switch");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Read-only operations (available while paused)
    // ---------------------------------------------------------------------

    /// Look up an identity record.
    pub fn identity(&self, user: &AccountId) -> Result<Option<IdentityRecord>, RegistryError> {
        self.storage.get(CF_IDENTITIES, user.as_str().as_bytes())
    }

    /// Look up a pending request.
    pub fn pending_request(
        &self,
        user: &AccountId,
        request_id: RequestId,
    ) -> Result<Option<PendingRequest>, RegistryError> {
        self.storage.get(CF_REQUESTS, &request_key(user, request_id))
    }

    /// Look up a verifier grant.
    pub fn verifier_grant(
        &self,
        verifier: &AccountId,
    ) -> Result<Option<VerifierGrant>, RegistryError> {
        self.storage.get(CF_VERIFIERS, verifier.as_str().as_bytes())
    }

    /// Whether `user` holds an active, unexpired verification at or above
    /// `min_level`. An unregistered user is simply `false`, never an error.
    pub fn has_valid_kyc(
        &self,
        user: &AccountId,
        min_level: KycLevel,
    ) -> Result<bool, RegistryError> {
        let now = self.clock.height();
        Ok(self
            .identity(user)?
            .is_some_and(|record| record.is_valid_for(min_level, now)))
    }

    /// Whether `verifier` holds an active grant.
    pub fn is_authorized_verifier(&self, verifier: &AccountId) -> Result<bool, RegistryError> {
        Ok(self
            .verifier_grant(verifier)?
            .is_some_and(|grant| grant.is_active))
    }

    /// Whether `verifier` may approve a request at `level`.
    pub fn can_verify_level(
        &self,
        verifier: &AccountId,
        level: KycLevel,
    ) -> Result<bool, RegistryError> {
        Ok(self
            .verifier_grant(verifier)?
            .is_some_and(|grant| grant.covers(level)))
    }

    /// Whether the registry currently accepts mutating operations.
    pub fn is_active(&self) -> Result<bool, RegistryError> {
        Ok(!self.paused()?)
    }

    /// The id the next submitted request will receive.
    pub fn next_request_id(&self) -> Result<RequestId, RegistryError> {
        Ok(self
            .storage
            .get::<RequestId>(CF_STATE, KEY_NEXT_REQUEST_ID)?
            .unwrap_or(FIRST_REQUEST_ID))
    }

    fn paused(&self) -> Result<bool, RegistryError> {
        Ok(self
            .storage
            .get::<bool>(CF_STATE, KEY_PAUSED)?
            .unwrap_or(false))
    }

    fn ensure_active(&self) -> Result<(), RegistryError> {
        if self.paused()? {
            return Err(RegistryError::Unauthorized);
        }
        Ok(())
    }
}
