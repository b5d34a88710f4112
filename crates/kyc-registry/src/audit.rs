//! Append-only audit trail of actions taken against identities.
//!
//! Ordering is the sole external guarantee: entries for a given identity,
//! read back, appear in the exact order they were appended. Entries are
//! immutable once appended; the log exposes shared references only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::IdentityId;

/// Action recorded against an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    DocumentSubmitted,
    DocumentVerified,
    LevelChanged,
    Suspended,
    Revoked,
    Reactivated,
}

impl AuditAction {
    /// Return the stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::DocumentSubmitted => "document_submitted",
            Self::DocumentVerified => "document_verified",
            Self::LevelChanged => "level_changed",
            Self::Suspended => "suspended",
            Self::Revoked => "revoked",
            Self::Reactivated => "reactivated",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// One immutable entry in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the action happened (microseconds since Unix epoch).
    pub timestamp: u64,
    pub identity_id: IdentityId,
    pub action: AuditAction,
    /// Free-form context for a human reviewer.
    pub detail: String,
}

impl AuditEntry {
    /// Create an entry stamped with the current time.
    pub fn new(identity_id: IdentityId, action: AuditAction, detail: impl Into<String>) -> Self {
        Self {
            timestamp: crate::time::now_micros(),
            identity_id,
            action,
            detail: detail.into(),
        }
    }

    /// Create an entry with an explicit timestamp.
    ///
    /// Used when several entries describe a single logical action and must
    /// share its timestamp (e.g. `document_verified` + `level_changed`).
    pub fn at(
        timestamp: u64,
        identity_id: IdentityId,
        action: AuditAction,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            identity_id,
            action,
            detail: detail.into(),
        }
    }
}

/// Append-only ordered log of [`AuditEntry`] records.
///
/// Alongside the primary sequence a per-identity position index is kept,
/// so `entries_for` does not scan the whole log.
#[derive(Debug, Default)]
pub struct AuditLog {
    /// Primary store, in append order.
    entries: Vec<AuditEntry>,
    /// Secondary index: identity -> positions in `entries`.
    by_identity: HashMap<IdentityId, Vec<usize>>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from previously persisted entries, preserving order.
    pub fn from_entries(entries: Vec<AuditEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.append(entry);
        }
        log
    }

    /// Append an entry. O(1); entries are never modified or removed.
    pub fn append(&mut self, entry: AuditEntry) {
        let position = self.entries.len();
        self.by_identity
            .entry(entry.identity_id.clone())
            .or_default()
            .push(position);
        self.entries.push(entry);
    }

    /// Return all entries for `id`, in append order.
    pub fn entries_for(&self, id: &IdentityId) -> Vec<&AuditEntry> {
        self.by_identity
            .get(id)
            .map(|positions| positions.iter().map(|&p| &self.entries[p]).collect())
            .unwrap_or_default()
    }

    /// Return the full log, in append order.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
