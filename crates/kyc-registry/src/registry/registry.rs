//! The registry: exclusive owner of all identity records and the global
//! audit log.
//!
//! Every mutating operation resolves the identity, applies the record
//! operation, and appends the matching audit entries. A failed operation
//! appends nothing and mutates nothing, so a reader never observes a
//! level change without its paired audit entry or vice versa.
//!
//! Methods take `&mut self`; in the single-threaded command-processing
//! model the borrow checker is the serialization point.

use std::collections::HashMap;

use log::{debug, info};

use crate::audit::{AuditAction, AuditEntry, AuditLog};
use crate::document::DocType;
use crate::error::{RegistryError, Result};
use crate::identity::{
    DocSelector, IdentityId, IdentityRecord, IdentityStatus, StatusChange, VerifyOutcome,
};
use crate::registry::projections::{IdentityReport, IdentitySummary, RegistryStats};

/// In-memory collection of identity records plus the global audit log.
///
/// Identity IDs are unique and never reused, even after revocation;
/// revoked records stay queryable indefinitely.
#[derive(Debug, Default)]
pub struct Registry {
    /// Primary store: identity ID -> record.
    records: HashMap<IdentityId, IdentityRecord>,
    /// Creation order of identity IDs.
    order: Vec<IdentityId>,
    /// Registered emails (lowercased) -> owning identity.
    emails: HashMap<String, IdentityId>,
    /// Global append-only audit log.
    audit: AuditLog,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted records and audit entries.
    ///
    /// `records` must be in creation order; the audit entries must be in
    /// append order. Both orders are preserved.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidFileFormat` when two records share
    /// an ID or an email.
    pub fn from_parts(records: Vec<IdentityRecord>, audit_entries: Vec<AuditEntry>) -> Result<Self> {
        let mut registry = Self::new();

        for record in records {
            let id = record.id.clone();
            let email_key = record.email.to_ascii_lowercase();

            if registry.records.contains_key(&id) {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "duplicate identity id {id}"
                )));
            }
            if registry.emails.contains_key(&email_key) {
                return Err(RegistryError::InvalidFileFormat(format!(
                    "duplicate email {} (identity {id})",
                    record.email
                )));
            }

            registry.emails.insert(email_key, id.clone());
            registry.order.push(id.clone());
            registry.records.insert(id, record);
        }

        registry.audit = AuditLog::from_entries(audit_entries);
        Ok(registry)
    }

    // ── Mutating operations ───────────────────────────────────────────────

    /// Register a new identity and return its fresh ID.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Validation` when `name` or `email` is empty
    /// or the email is already registered.
    pub fn create(&mut self, name: &str, email: &str) -> Result<IdentityId> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(RegistryError::Validation("name must not be empty".into()));
        }
        if email.is_empty() {
            return Err(RegistryError::Validation("email must not be empty".into()));
        }

        let email_key = email.to_ascii_lowercase();
        if self.emails.contains_key(&email_key) {
            return Err(RegistryError::Validation(format!(
                "email {email} is already registered"
            )));
        }

        let id = IdentityId::generate();
        let record = IdentityRecord::new(id.clone(), name, email);

        self.emails.insert(email_key, id.clone());
        self.order.push(id.clone());
        self.records.insert(id.clone(), record);
        self.audit.append(AuditEntry::new(
            id.clone(),
            AuditAction::Created,
            format!("created identity for {email}"),
        ));

        info!("created identity {id} for {email}");
        Ok(id)
    }

    /// Submit a new document for `id`. Returns the document's position in
    /// the identity's submission order.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown ID, or
    /// `RegistryError::InvalidState` unless the identity is active.
    pub fn submit_document(
        &mut self,
        id: &IdentityId,
        doc_type: DocType,
        number: &str,
        issuing_country: &str,
        expiry: &str,
    ) -> Result<usize> {
        let record = Self::resolve_mut(&mut self.records, id)?;
        let index = record.submit_document(doc_type, number, issuing_country, expiry)?;

        self.audit.append(AuditEntry::new(
            id.clone(),
            AuditAction::DocumentSubmitted,
            format!("submitted {doc_type} document ({issuing_country})"),
        ));

        debug!("identity {id}: submitted {doc_type} document at index {index}");
        Ok(index)
    }

    /// Verify the document matched by `selector` and recompute the level.
    ///
    /// Appends a `document_verified` entry, followed by a `level_changed`
    /// entry sharing the same timestamp when the level moved.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown ID or when no
    /// matching unverified document exists, or
    /// `RegistryError::InvalidState` unless the identity is active.
    pub fn verify_document(
        &mut self,
        id: &IdentityId,
        selector: DocSelector,
    ) -> Result<VerifyOutcome> {
        let record = Self::resolve_mut(&mut self.records, id)?;
        let outcome = record.verify_document(selector)?;

        let now = crate::time::now_micros();
        self.audit.append(AuditEntry::at(
            now,
            id.clone(),
            AuditAction::DocumentVerified,
            format!(
                "verified {} document at index {}",
                outcome.doc_type, outcome.index
            ),
        ));
        if outcome.level_changed() {
            self.audit.append(AuditEntry::at(
                now,
                id.clone(),
                AuditAction::LevelChanged,
                format!("{} -> {}", outcome.previous_level, outcome.level),
            ));
            info!(
                "identity {id}: level {} -> {}",
                outcome.previous_level, outcome.level
            );
        }

        Ok(outcome)
    }

    /// Suspend `id`. Reversible via [`Registry::reactivate`].
    ///
    /// Re-suspending an already-suspended identity still records an audit
    /// entry: every invocation is logged regardless of resulting state
    /// change.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown ID, or
    /// `RegistryError::InvalidState` when the identity is revoked.
    pub fn suspend(&mut self, id: &IdentityId, reason: Option<&str>) -> Result<()> {
        let record = Self::resolve_mut(&mut self.records, id)?;
        let change = record.suspend()?;

        let mut detail = match change {
            StatusChange::Applied => "suspended".to_string(),
            StatusChange::AlreadyInState => "suspend requested; already suspended".to_string(),
        };
        if let Some(reason) = reason {
            detail.push_str(&format!(" (reason: {reason})"));
        }
        self.audit
            .append(AuditEntry::new(id.clone(), AuditAction::Suspended, detail));

        info!("identity {id}: suspended");
        Ok(())
    }

    /// Revoke `id`. Terminal; never errors on a known ID.
    ///
    /// A second revoke is an idempotent no-op that is still logged for
    /// history completeness.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown ID.
    pub fn revoke(&mut self, id: &IdentityId, reason: Option<&str>) -> Result<()> {
        let record = Self::resolve_mut(&mut self.records, id)?;
        let change = record.revoke();

        let mut detail = match change {
            StatusChange::Applied => "revoked".to_string(),
            StatusChange::AlreadyInState => "revoke requested; already revoked".to_string(),
        };
        if let Some(reason) = reason {
            detail.push_str(&format!(" (reason: {reason})"));
        }
        self.audit
            .append(AuditEntry::new(id.clone(), AuditAction::Revoked, detail));

        info!("identity {id}: revoked");
        Ok(())
    }

    /// Reactivate a suspended identity.
    ///
    /// A reactivate on an already-active identity is refused, but the
    /// attempt is still recorded per the logging-completeness policy. A
    /// reactivate on a revoked identity is refused outright and not
    /// recorded: the terminal state rejects the action.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown ID, or
    /// `RegistryError::InvalidState` when the identity is revoked or
    /// already active.
    pub fn reactivate(&mut self, id: &IdentityId) -> Result<()> {
        let record = Self::resolve_mut(&mut self.records, id)?;
        let prior = record.status;
        let result = record.reactivate();

        match prior {
            IdentityStatus::Suspended => {
                self.audit.append(AuditEntry::new(
                    id.clone(),
                    AuditAction::Reactivated,
                    "reactivated",
                ));
                info!("identity {id}: reactivated");
            }
            IdentityStatus::Active => {
                self.audit.append(AuditEntry::new(
                    id.clone(),
                    AuditAction::Reactivated,
                    "reactivation refused: already active",
                ));
            }
            IdentityStatus::Revoked => {}
        }

        result
    }

    // ── Read-only operations ──────────────────────────────────────────────

    /// Look up a single identity record.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown ID.
    pub fn get(&self, id: &IdentityId) -> Result<&IdentityRecord> {
        self.records
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(format!("identity {id} not found")))
    }

    /// All records, including revoked ones, in creation order.
    pub fn list(&self) -> Vec<&IdentityRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Case-insensitive substring search over holder name and email, in
    /// creation order.
    pub fn search(&self, query: &str) -> Vec<&IdentityRecord> {
        let needle = query.to_lowercase();
        self.list()
            .into_iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle) || r.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Aggregate counts by status and verification level.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats::aggregate(self.list().into_iter())
    }

    /// Condensed view of a single identity.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown ID.
    pub fn check(&self, id: &IdentityId) -> Result<IdentitySummary> {
        let record = self.get(id)?;
        Ok(IdentitySummary::from_record(
            record,
            self.audit.entries_for(id).len(),
        ))
    }

    /// Full view of a single identity including its ordered audit trail.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for an unknown ID.
    pub fn report(&self, id: &IdentityId) -> Result<IdentityReport> {
        let record = self.get(id)?;
        let audit_trail: Vec<AuditEntry> = self
            .audit
            .entries_for(id)
            .into_iter()
            .cloned()
            .collect();

        Ok(IdentityReport {
            summary: IdentitySummary::from_record(record, audit_trail.len()),
            documents: record.documents.clone(),
            audit_trail,
        })
    }

    /// The global audit log.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry holds no identities.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    /// Resolve a mutable record. Free-standing over the map so the audit
    /// log stays borrowable alongside the returned reference.
    fn resolve_mut<'a>(
        records: &'a mut HashMap<IdentityId, IdentityRecord>,
        id: &IdentityId,
    ) -> Result<&'a mut IdentityRecord> {
        records
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(format!("identity {id} not found")))
    }
}
