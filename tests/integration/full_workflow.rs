//! Integration test: full end-to-end workflow.
//!
//! Walks the complete lifecycle:
//! 1. Create identities
//! 2. Submit documents
//! 3. Verify documents and watch the level climb
//! 4. Suspend / reactivate
//! 5. Revoke and confirm the terminal state
//! 6. Read back summaries, reports, and stats

use kyc_registry::{
    AuditAction, DocSelector, DocType, Registry, RegistryError, VerificationLevel,
};

#[test]
fn full_workflow_create_to_revocation() {
    let mut registry = Registry::new();

    // ── Step 1: Create identities ───────────────────────────────────────
    let alice = registry.create("Alice Smith", "alice@example.com").unwrap();
    let bob = registry.create("Bob Jones", "bob@example.com").unwrap();

    assert_ne!(alice, bob);
    assert!(alice.0.starts_with("idn_"));

    let record = registry.get(&alice).unwrap();
    assert_eq!(record.status.as_tag(), "active");
    assert_eq!(record.verification_level, VerificationLevel::Unverified);

    // ── Step 2: Submit documents ────────────────────────────────────────
    registry
        .submit_document(&alice, DocType::Passport, "P123456", "US", "2030-01-01")
        .unwrap();
    registry
        .submit_document(&alice, DocType::License, "DL789", "US", "2029-06-01")
        .unwrap();
    registry
        .submit_document(&alice, DocType::UtilityBill, "UB-44", "US", "2026-09-01")
        .unwrap();

    // Submission alone never moves the level.
    assert_eq!(
        registry.get(&alice).unwrap().verification_level,
        VerificationLevel::Unverified
    );

    // ── Step 3: Verify documents, level climbs ──────────────────────────
    let o1 = registry
        .verify_document(&alice, DocSelector::Type(DocType::Passport))
        .unwrap();
    assert_eq!(o1.level, VerificationLevel::Basic);

    let o2 = registry
        .verify_document(&alice, DocSelector::Type(DocType::UtilityBill))
        .unwrap();
    assert_eq!(o2.level, VerificationLevel::Standard);

    let o3 = registry
        .verify_document(&alice, DocSelector::Type(DocType::License))
        .unwrap();
    assert_eq!(o3.level, VerificationLevel::Enhanced);

    // ── Step 4: Suspend and reactivate ──────────────────────────────────
    registry.suspend(&alice, Some("periodic review")).unwrap();
    assert!(matches!(
        registry.submit_document(&alice, DocType::Passport, "P2", "US", "2031-01-01"),
        Err(RegistryError::InvalidState(_))
    ));

    registry.reactivate(&alice).unwrap();
    assert_eq!(registry.get(&alice).unwrap().status.as_tag(), "active");

    // Suspension did not disturb the derived level.
    assert_eq!(
        registry.get(&alice).unwrap().verification_level,
        VerificationLevel::Enhanced
    );

    // ── Step 5: Revoke is terminal ──────────────────────────────────────
    registry.revoke(&bob, Some("fraudulent activity")).unwrap();
    assert!(matches!(
        registry.submit_document(&bob, DocType::Passport, "P9", "UK", "2030-01-01"),
        Err(RegistryError::InvalidState(_))
    ));
    assert!(matches!(
        registry.reactivate(&bob),
        Err(RegistryError::InvalidState(_))
    ));

    // Revoked records stay queryable.
    assert_eq!(registry.get(&bob).unwrap().status.as_tag(), "revoked");
    assert_eq!(registry.list().len(), 2);

    // ── Step 6: Projections ─────────────────────────────────────────────
    let summary = registry.check(&alice).unwrap();
    assert_eq!(summary.total_documents, 3);
    assert_eq!(summary.verified_documents, 3);
    assert_eq!(summary.verification_level, VerificationLevel::Enhanced);

    let report = registry.report(&alice).unwrap();
    assert_eq!(report.audit_trail.len(), summary.audit_entries);
    assert_eq!(report.audit_trail[0].action, AuditAction::Created);

    let stats = registry.stats();
    assert_eq!(stats.total_identities, 2);
    assert_eq!(stats.by_status["active"], 1);
    assert_eq!(stats.by_status["revoked"], 1);
    assert_eq!(stats.by_verification_level["enhanced"], 1);
    assert_eq!(stats.by_verification_level["unverified"], 1);
    assert_eq!(stats.total_documents, 3);
    assert_eq!(stats.verified_documents, 3);
}

// ── Acceptance scenarios ─────────────────────────────────────────────────

#[test]
fn scenario_new_identity_starts_unverified_and_active() {
    let mut registry = Registry::new();
    let id = registry.create("Alice", "a@x.com").unwrap();
    let record = registry.get(&id).unwrap();
    assert_eq!(record.verification_level, VerificationLevel::Unverified);
    assert_eq!(record.status.as_tag(), "active");
}

#[test]
fn scenario_one_verified_passport_is_basic() {
    let mut registry = Registry::new();
    let id = registry.create("Alice", "a@x.com").unwrap();
    registry
        .submit_document(&id, DocType::Passport, "P1", "US", "2030-01-01")
        .unwrap();
    registry
        .verify_document(&id, DocSelector::Type(DocType::Passport))
        .unwrap();
    assert_eq!(
        registry.get(&id).unwrap().verification_level,
        VerificationLevel::Basic
    );
}

#[test]
fn scenario_passport_plus_utility_bill_is_standard() {
    let mut registry = Registry::new();
    let id = registry.create("Alice", "a@x.com").unwrap();
    registry
        .submit_document(&id, DocType::Passport, "P1", "US", "2030-01-01")
        .unwrap();
    registry
        .submit_document(&id, DocType::UtilityBill, "U1", "US", "2026-01-01")
        .unwrap();
    registry.verify_document(&id, DocSelector::Index(0)).unwrap();
    registry.verify_document(&id, DocSelector::Index(1)).unwrap();
    assert_eq!(
        registry.get(&id).unwrap().verification_level,
        VerificationLevel::Standard
    );
}

#[test]
fn scenario_three_verified_with_primary_is_enhanced() {
    let mut registry = Registry::new();
    let id = registry.create("Alice", "a@x.com").unwrap();
    for (doc_type, number) in [
        (DocType::Passport, "P1"),
        (DocType::License, "L1"),
        (DocType::UtilityBill, "U1"),
    ] {
        registry
            .submit_document(&id, doc_type, number, "US", "2030-01-01")
            .unwrap();
    }
    for i in 0..3 {
        registry.verify_document(&id, DocSelector::Index(i)).unwrap();
    }
    assert_eq!(
        registry.get(&id).unwrap().verification_level,
        VerificationLevel::Enhanced
    );
}

#[test]
fn scenario_three_utility_bills_stay_standard() {
    let mut registry = Registry::new();
    let id = registry.create("Alice", "a@x.com").unwrap();
    for number in ["U1", "U2", "U3"] {
        registry
            .submit_document(&id, DocType::UtilityBill, number, "US", "2026-01-01")
            .unwrap();
    }
    for i in 0..3 {
        registry.verify_document(&id, DocSelector::Index(i)).unwrap();
    }
    // No verified primary document, despite count = 3.
    assert_eq!(
        registry.get(&id).unwrap().verification_level,
        VerificationLevel::Standard
    );
}

#[test]
fn scenario_submit_after_revoke_fails() {
    let mut registry = Registry::new();
    let id = registry.create("Alice", "a@x.com").unwrap();
    registry.revoke(&id, None).unwrap();
    assert!(matches!(
        registry.submit_document(&id, DocType::Passport, "P1", "US", "2030-01-01"),
        Err(RegistryError::InvalidState(_))
    ));
}

// ── Audit completeness ───────────────────────────────────────────────────

#[test]
fn audit_trail_has_one_entry_per_mutation_plus_level_changes() {
    let mut registry = Registry::new();
    let id = registry.create("Alice", "a@x.com").unwrap();

    // 6 mutating calls after create: 2 submits, 2 verifies, suspend,
    // reactivate. Both verifies move the level, adding 2 paired entries.
    registry
        .submit_document(&id, DocType::Passport, "P1", "US", "2030-01-01")
        .unwrap();
    registry
        .submit_document(&id, DocType::UtilityBill, "U1", "US", "2026-01-01")
        .unwrap();
    registry.verify_document(&id, DocSelector::Index(0)).unwrap();
    registry.verify_document(&id, DocSelector::Index(1)).unwrap();
    registry.suspend(&id, None).unwrap();
    registry.reactivate(&id).unwrap();

    let entries = registry.audit().entries_for(&id);
    assert_eq!(entries.len(), 1 + 6 + 2);

    let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Created,
            AuditAction::DocumentSubmitted,
            AuditAction::DocumentSubmitted,
            AuditAction::DocumentVerified,
            AuditAction::LevelChanged,
            AuditAction::DocumentVerified,
            AuditAction::LevelChanged,
            AuditAction::Suspended,
            AuditAction::Reactivated,
        ]
    );

    // Timestamps never go backwards.
    for pair in entries.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[test]
fn audit_trails_are_isolated_per_identity() {
    let mut registry = Registry::new();
    let a = registry.create("Alice", "a@x.com").unwrap();
    let b = registry.create("Bob", "b@x.com").unwrap();

    registry
        .submit_document(&a, DocType::Passport, "P1", "US", "2030-01-01")
        .unwrap();
    registry.suspend(&b, None).unwrap();

    assert_eq!(registry.audit().entries_for(&a).len(), 2);
    assert_eq!(registry.audit().entries_for(&b).len(), 2);
    assert_eq!(registry.audit().len(), 4);
}
