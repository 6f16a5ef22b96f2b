//! Integration test: ownership, verifier grants, and the pause switch.
//!
//! The owner account is fixed when the registry is opened; every privileged
//! call compares against it. Verifiers act only within their granted ceiling,
//! and the pause switch gates every mutating operation while leaving the
//! read surface untouched.

use certus_analytics::{AnalyticsEngine, AnalyticsError, BatchQuery};
use certus_core::KycLevel;
use certus_integration_tests::{account, doc, TestLedger};
use certus_registry::RegistryError;

fn summary_query() -> BatchQuery {
    BatchQuery {
        users: Vec::new(),
        operation: "SUMMARY".into(),
        min_level: 1,
        include_expired: false,
    }
}

// =========================================================================
// Owner privileges
// =========================================================================

#[test]
fn test_only_the_owner_grants_verifiers() {
    let ledger = TestLedger::new(10);
    let candidate = account("candidate");

    let err = ledger
        .registry
        .authorize_verifier(&account("mallory"), &candidate, KycLevel::Basic)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized));
    assert_eq!(err.code(), Some(100));
    assert!(!ledger.registry.is_authorized_verifier(&candidate).unwrap());

    // being a verifier does not confer the owner's privileges
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);
    let err = ledger
        .registry
        .authorize_verifier(&verifier, &candidate, KycLevel::Basic)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized));
    assert!(!ledger.registry.is_authorized_verifier(&candidate).unwrap());
}

#[test]
fn test_reauthorization_raises_and_lowers_the_ceiling() {
    let ledger = TestLedger::new(10);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);

    ledger.clock.advance(5);
    ledger
        .registry
        .authorize_verifier(&ledger.owner, &verifier, KycLevel::Basic)
        .unwrap();

    let grant = ledger.registry.verifier_grant(&verifier).unwrap().unwrap();
    assert_eq!(grant.max_level, KycLevel::Basic);
    assert_eq!(grant.authorized_at, 15);
    assert!(!ledger
        .registry
        .can_verify_level(&verifier, KycLevel::Intermediate)
        .unwrap());
}

#[test]
fn test_pause_is_owner_only() {
    let ledger = TestLedger::new(10);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);

    for caller in [account("mallory"), verifier] {
        let err = ledger.registry.set_paused(&caller, true).unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized));
    }
    assert!(ledger.registry.is_active().unwrap());
}

// =========================================================================
// Verifier grant ceilings
// =========================================================================

#[test]
fn test_grant_ceiling_is_inclusive() {
    let tiers = [KycLevel::Basic, KycLevel::Intermediate, KycLevel::Advanced];

    // a grant at tier k approves every request at or below k, nothing above
    for max_level in tiers {
        let ledger = TestLedger::new(10);
        let verifier = ledger.verifier("verifier", max_level);

        for requested in tiers {
            let user = account(&format!("user-{}", requested.as_u8()));
            ledger.registry.register(&user, doc(1)).unwrap();
            let id = ledger
                .registry
                .submit_request(&user, requested, doc(2), "")
                .unwrap();

            let outcome = ledger.registry.approve(&verifier, &user, id);
            if requested <= max_level {
                outcome.unwrap();
            } else {
                assert!(matches!(outcome.unwrap_err(), RegistryError::Unauthorized));
                // a refused approval leaves the request pending
                assert!(ledger.registry.pending_request(&user, id).unwrap().is_some());
            }
        }
    }
}

#[test]
fn test_stranger_cannot_approve() {
    let ledger = TestLedger::new(10);
    let alice = account("alice");
    ledger.registry.register(&alice, doc(1)).unwrap();
    let id = ledger
        .registry
        .submit_request(&alice, KycLevel::Basic, doc(2), "")
        .unwrap();

    let err = ledger
        .registry
        .approve(&account("impostor"), &alice, id)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized));
    assert!(ledger.registry.pending_request(&alice, id).unwrap().is_some());
}

#[test]
fn test_approving_a_missing_request_changes_nothing() {
    let ledger = TestLedger::new(10);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);
    let alice = account("alice");
    ledger.registry.register(&alice, doc(1)).unwrap();

    // wrong id, wrong user, and both
    for (user, id) in [(&alice, 7), (&account("ghost"), 1), (&account("ghost"), 7)] {
        let err = ledger.registry.approve(&verifier, user, id).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound));
        assert_eq!(err.code(), Some(102));
    }

    let record = ledger.registry.identity(&alice).unwrap().unwrap();
    assert!(record.verification.is_none());
}

// =========================================================================
// The pause switch
// =========================================================================

#[test]
fn test_pause_blocks_every_mutation_and_analytics() {
    let ledger = TestLedger::new(10);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);
    let alice = account("alice");
    ledger.registry.register(&alice, doc(1)).unwrap();
    let id = ledger
        .registry
        .submit_request(&alice, KycLevel::Basic, doc(2), "")
        .unwrap();

    ledger.registry.set_paused(&ledger.owner, true).unwrap();
    assert!(!ledger.registry.is_active().unwrap());

    let err = ledger.registry.register(&account("bob"), doc(3)).unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized));
    let err = ledger
        .registry
        .submit_request(&alice, KycLevel::Basic, doc(2), "")
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized));
    let err = ledger.registry.approve(&verifier, &alice, id).unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized));
    let err = ledger
        .registry
        .authorize_verifier(&ledger.owner, &account("v2"), KycLevel::Basic)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized));

    // batch analytics is gated too, even for the owner
    let engine = AnalyticsEngine::new(ledger.registry.clone());
    let err = engine.run(&ledger.owner, &summary_query()).unwrap_err();
    assert!(matches!(err, AnalyticsError::Unauthorized));
}

#[test]
fn test_reads_survive_a_pause() {
    let ledger = TestLedger::new(10);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);
    let alice = ledger.verified_user("alice", &verifier, KycLevel::Basic);
    let pending = account("pending");
    ledger.registry.register(&pending, doc(1)).unwrap();
    let id = ledger
        .registry
        .submit_request(&pending, KycLevel::Basic, doc(2), "")
        .unwrap();

    ledger.registry.set_paused(&ledger.owner, true).unwrap();

    assert!(ledger.registry.identity(&alice).unwrap().is_some());
    assert!(ledger.registry.pending_request(&pending, id).unwrap().is_some());
    assert!(ledger.registry.has_valid_kyc(&alice, KycLevel::Basic).unwrap());
    assert!(ledger.registry.is_authorized_verifier(&verifier).unwrap());
}

#[test]
fn test_resume_restores_the_full_surface() {
    let ledger = TestLedger::new(10);

    ledger.registry.set_paused(&ledger.owner, true).unwrap();
    // unpausing is never blocked by the switch itself
    ledger.registry.set_paused(&ledger.owner, false).unwrap();
    assert!(ledger.registry.is_active().unwrap());

    ledger.registry.register(&account("alice"), doc(1)).unwrap();
    ledger
        .registry
        .authorize_verifier(&ledger.owner, &account("v"), KycLevel::Basic)
        .unwrap();

    let engine = AnalyticsEngine::new(ledger.registry.clone());
    assert!(engine.run(&ledger.owner, &summary_query()).is_ok());
}
