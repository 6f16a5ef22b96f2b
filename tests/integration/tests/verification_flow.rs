//! Integration test: full verification lifecycle across crates.
//!
//! Exercises the register → submit → authorize → approve flow end to end
//! using certus-registry and certus-core together, with the manual clock
//! standing in for the host chain.

use certus_core::KycLevel;
use certus_integration_tests::{account, doc, TestLedger};
use certus_registry::RegistryError;

// =========================================================================
// The canonical flow: register → submit → authorize → approve
// =========================================================================

#[test]
fn test_full_verification_scenario() {
    let ledger = TestLedger::new(100);
    let alice = account("alice");

    // Step 1: Alice registers with her first document
    ledger.registry.register(&alice, doc(0x01)).unwrap();
    let record = ledger.registry.identity(&alice).unwrap().unwrap();
    assert_eq!(record.level(), 0);
    assert_eq!(record.registered_at, 100);
    assert_eq!(record.document_hash, doc(0x01));

    // Step 2: Alice asks for Intermediate with a newer document
    let id = ledger
        .registry
        .submit_request(&alice, KycLevel::Intermediate, doc(0x02), "first verification")
        .unwrap();
    assert_eq!(id, 1, "the global counter starts at 1");

    // Step 3: the owner authorizes a verifier for every tier
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);

    // Step 4: the verifier approves at a later height
    ledger.clock.set(400);
    ledger.registry.approve(&verifier, &alice, id).unwrap();

    let record = ledger.registry.identity(&alice).unwrap().unwrap();
    let verification = record.verification.expect("record should be verified");
    assert_eq!(verification.level, KycLevel::Intermediate);
    assert_eq!(verification.verified_at, 400);
    assert_eq!(verification.expires_at, 400 + 26_280);
    assert_eq!(verification.verifier, verifier);

    // the request's document replaces the registration-time one,
    // and the request itself is gone
    assert_eq!(record.document_hash, doc(0x02));
    assert!(ledger.registry.pending_request(&alice, id).unwrap().is_none());

    // Step 5: downstream consumers see a valid Intermediate verification
    assert!(ledger.registry.has_valid_kyc(&alice, KycLevel::Basic).unwrap());
    assert!(ledger
        .registry
        .has_valid_kyc(&alice, KycLevel::Intermediate)
        .unwrap());
    assert!(!ledger
        .registry
        .has_valid_kyc(&alice, KycLevel::Advanced)
        .unwrap());
}

#[test]
fn test_expiry_offset_per_tier() {
    for (level, window) in [
        (KycLevel::Basic, 8_760),
        (KycLevel::Intermediate, 26_280),
        (KycLevel::Advanced, 52_560),
    ] {
        let ledger = TestLedger::new(1_000);
        let verifier = ledger.verifier("verifier", KycLevel::Advanced);
        let user = account("user");
        ledger.registry.register(&user, doc(1)).unwrap();
        let id = ledger
            .registry
            .submit_request(&user, level, doc(2), "")
            .unwrap();

        ledger.clock.set(2_000);
        ledger.registry.approve(&verifier, &user, id).unwrap();

        let record = ledger.registry.identity(&user).unwrap().unwrap();
        assert_eq!(
            record.verification.unwrap().expires_at,
            2_000 + window,
            "expiry for {level} counts from the approval height"
        );
    }
}

#[test]
fn test_validity_is_monotonic_in_min_level() {
    let ledger = TestLedger::new(100);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);
    let bob = ledger.verified_user("bob", &verifier, KycLevel::Intermediate);

    // valid at Intermediate implies valid at every tier below it
    assert!(ledger
        .registry
        .has_valid_kyc(&bob, KycLevel::Intermediate)
        .unwrap());
    assert!(ledger.registry.has_valid_kyc(&bob, KycLevel::Basic).unwrap());
    assert!(!ledger
        .registry
        .has_valid_kyc(&bob, KycLevel::Advanced)
        .unwrap());
}

// =========================================================================
// Renewal and repeated verification
// =========================================================================

#[test]
fn test_reverification_refreshes_level_and_expiry() {
    let ledger = TestLedger::new(100);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);
    let carol = account("carol");
    ledger.registry.register(&carol, doc(1)).unwrap();

    let first = ledger
        .registry
        .submit_request(&carol, KycLevel::Basic, doc(2), "")
        .unwrap();
    ledger.registry.approve(&verifier, &carol, first).unwrap();

    // near the end of the Basic window, step up to Advanced
    ledger.clock.set(8_100);
    let second = ledger
        .registry
        .submit_request(&carol, KycLevel::Advanced, doc(3), "tier upgrade")
        .unwrap();
    ledger.registry.approve(&verifier, &carol, second).unwrap();

    let record = ledger.registry.identity(&carol).unwrap().unwrap();
    let verification = record.verification.unwrap();
    assert_eq!(verification.level, KycLevel::Advanced);
    assert_eq!(verification.verified_at, 8_100);
    assert_eq!(verification.expires_at, 8_100 + 52_560);
    assert_eq!(record.document_hash, doc(3));
}

#[test]
fn test_verification_lapses_at_expiry_height() {
    let ledger = TestLedger::new(500);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);
    let dave = ledger.verified_user("dave", &verifier, KycLevel::Basic);

    ledger.clock.set(500 + 8_759);
    assert!(ledger.registry.has_valid_kyc(&dave, KycLevel::Basic).unwrap());

    // expires_at itself is no longer valid
    ledger.clock.set(500 + 8_760);
    assert!(!ledger.registry.has_valid_kyc(&dave, KycLevel::Basic).unwrap());
}

// =========================================================================
// The request queue
// =========================================================================

#[test]
fn test_requests_from_different_users_share_the_id_sequence() {
    let ledger = TestLedger::new(10);
    let alice = account("alice");
    let bob = account("bob");
    ledger.registry.register(&alice, doc(1)).unwrap();
    ledger.registry.register(&bob, doc(2)).unwrap();

    let a1 = ledger
        .registry
        .submit_request(&alice, KycLevel::Basic, doc(1), "")
        .unwrap();
    let b1 = ledger
        .registry
        .submit_request(&bob, KycLevel::Intermediate, doc(2), "")
        .unwrap();
    let a2 = ledger
        .registry
        .submit_request(&alice, KycLevel::Advanced, doc(3), "")
        .unwrap();

    assert_eq!((a1, b1, a2), (1, 2, 3));
    assert!(ledger.registry.pending_request(&alice, a1).unwrap().is_some());
    assert!(ledger.registry.pending_request(&bob, b1).unwrap().is_some());
    // ids are scoped to their submitter
    assert!(ledger.registry.pending_request(&bob, a1).unwrap().is_none());
    assert!(ledger.registry.pending_request(&alice, b1).unwrap().is_none());
}

#[test]
fn test_approval_consumes_only_the_approved_request() {
    let ledger = TestLedger::new(10);
    let verifier = ledger.verifier("verifier", KycLevel::Advanced);
    let alice = account("alice");
    ledger.registry.register(&alice, doc(1)).unwrap();

    let basic = ledger
        .registry
        .submit_request(&alice, KycLevel::Basic, doc(2), "")
        .unwrap();
    let advanced = ledger
        .registry
        .submit_request(&alice, KycLevel::Advanced, doc(3), "")
        .unwrap();

    ledger.registry.approve(&verifier, &alice, advanced).unwrap();

    assert!(ledger
        .registry
        .pending_request(&alice, advanced)
        .unwrap()
        .is_none());
    // the older request stays pending until someone approves it
    let remaining = ledger
        .registry
        .pending_request(&alice, basic)
        .unwrap()
        .unwrap();
    assert_eq!(remaining.requested_level, KycLevel::Basic);
}

#[test]
fn test_out_of_range_level_never_reaches_the_queue() {
    let ledger = TestLedger::new(10);
    let alice = account("alice");
    ledger.registry.register(&alice, doc(1)).unwrap();

    // tier parsing is the boundary; 4 fails before any registry call
    let err = KycLevel::from_u8(4).unwrap_err();
    assert_eq!(err.code(), Some(103));
    assert_eq!(ledger.registry.next_request_id().unwrap(), 1);
}

#[test]
fn test_duplicate_registration_is_rejected_without_side_effects() {
    let ledger = TestLedger::new(50);
    let user = account("erin");
    ledger.registry.register(&user, doc(1)).unwrap();

    ledger.clock.advance(10);
    let err = ledger.registry.register(&user, doc(9)).unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyRegistered));

    // the original record is untouched and no id was burned
    let record = ledger.registry.identity(&user).unwrap().unwrap();
    assert_eq!(record.registered_at, 50);
    assert_eq!(record.document_hash, doc(1));
    assert_eq!(ledger.registry.next_request_id().unwrap(), 1);
}
