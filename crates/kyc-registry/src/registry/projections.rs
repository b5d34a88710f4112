//! Read-only projections returned to callers for rendering.
//!
//! These are plain serializable records; the CLI (or any other caller)
//! decides how to present them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::audit::AuditEntry;
use crate::document::Document;
use crate::identity::{IdentityId, IdentityRecord, IdentityStatus, VerificationLevel};

/// Condensed view of a single identity.
#[derive(Debug, Clone, Serialize)]
pub struct IdentitySummary {
    pub identity_id: IdentityId,
    pub name: String,
    pub email: String,
    pub status: IdentityStatus,
    pub verification_level: VerificationLevel,
    pub created_at: u64,
    pub total_documents: usize,
    pub verified_documents: usize,
    pub audit_entries: usize,
}

impl IdentitySummary {
    /// Build a summary from a record and its audit entry count.
    pub fn from_record(record: &IdentityRecord, audit_entries: usize) -> Self {
        Self {
            identity_id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            status: record.status,
            verification_level: record.verification_level,
            created_at: record.created_at,
            total_documents: record.documents.len(),
            verified_documents: record.verified_document_count(),
            audit_entries,
        }
    }
}

/// Full view of a single identity: summary, documents, and the ordered
/// audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityReport {
    pub summary: IdentitySummary,
    pub documents: Vec<Document>,
    pub audit_trail: Vec<AuditEntry>,
}

/// Aggregate counts across all identities. Pure aggregation, no mutation.
///
/// Both count maps carry every enum variant, zero-filled, so callers can
/// render stable tables without probing for missing keys.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub total_identities: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_verification_level: BTreeMap<String, usize>,
    pub total_documents: usize,
    pub verified_documents: usize,
    /// Percent of submitted documents that are verified, rounded to two
    /// decimals. Zero when no documents exist.
    pub verification_rate: f64,
}

impl RegistryStats {
    /// Aggregate stats over an iterator of records.
    pub fn aggregate<'a>(records: impl Iterator<Item = &'a IdentityRecord>) -> Self {
        let mut by_status: BTreeMap<String, usize> = IdentityStatus::ALL
            .iter()
            .map(|s| (s.as_tag().to_string(), 0))
            .collect();
        let mut by_verification_level: BTreeMap<String, usize> = VerificationLevel::ALL
            .iter()
            .map(|l| (l.as_tag().to_string(), 0))
            .collect();

        let mut total_identities = 0;
        let mut total_documents = 0;
        let mut verified_documents = 0;

        for record in records {
            total_identities += 1;
            total_documents += record.documents.len();
            verified_documents += record.verified_document_count();
            *by_status
                .entry(record.status.as_tag().to_string())
                .or_insert(0) += 1;
            *by_verification_level
                .entry(record.verification_level.as_tag().to_string())
                .or_insert(0) += 1;
        }

        let verification_rate = if total_documents > 0 {
            (verified_documents as f64 / total_documents as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total_identities,
            by_status,
            by_verification_level,
            total_documents,
            verified_documents,
            verification_rate,
        }
    }
}
