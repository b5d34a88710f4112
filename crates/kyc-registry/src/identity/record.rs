//! Identity record — holder data, document set, lifecycle status.
//!
//! The record enforces the lifecycle rules locally: `revoked` is terminal,
//! `suspended` blocks document mutations, and the verification level is
//! recomputed from the document set after every verify so it is never stale.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::document::{DocType, Document};
use crate::error::{RegistryError, Result};
use crate::identity::level::{level_for, VerificationLevel};

/// Unique identifier for an identity.
///
/// Format: `idn_` + base58 of the first 16 bytes of SHA-256 over fresh
/// random bytes. IDs are assigned at creation, immutable, and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(pub String);

impl IdentityId {
    /// Generate a fresh identity ID.
    pub fn generate() -> Self {
        let mut entropy = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut entropy);
        let hash = Sha256::digest(entropy);
        let encoded = bs58::encode(&hash[..16]).into_string();
        Self(format!("idn_{encoded}"))
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an identity.
///
/// Wire tokens are fixed: `active`, `suspended`, `revoked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    Active,
    Suspended,
    Revoked,
}

impl IdentityStatus {
    /// All statuses, in declaration order.
    pub const ALL: [IdentityStatus; 3] = [
        IdentityStatus::Active,
        IdentityStatus::Suspended,
        IdentityStatus::Revoked,
    ];

    /// Return the stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Revoked => "revoked",
        }
    }
}

impl std::fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// Selects which document a verify action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocSelector {
    /// Position in the submission order (0-based).
    Index(usize),
    /// First unverified document of this type.
    Type(DocType),
}

/// Result of a lifecycle transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The status moved to the requested state.
    Applied,
    /// The record was already in the requested state; nothing changed.
    AlreadyInState,
}

/// Result of verifying a document: which document, and how the level moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Position of the verified document in the submission order.
    pub index: usize,
    pub doc_type: DocType,
    pub previous_level: VerificationLevel,
    pub level: VerificationLevel,
}

impl VerifyOutcome {
    /// Whether this verification moved the level.
    pub fn level_changed(&self) -> bool {
        self.previous_level != self.level
    }
}

/// An identity subject to KYC verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: IdentityId,
    pub name: String,
    pub email: String,
    pub status: IdentityStatus,
    /// Documents in submission order. Append-only once submitted.
    pub documents: Vec<Document>,
    /// Derived from `documents` via the level rule; never set directly.
    pub verification_level: VerificationLevel,
    /// Creation timestamp (microseconds since Unix epoch).
    pub created_at: u64,
}

impl IdentityRecord {
    /// Construct a record in its initial state: active, unverified, no
    /// documents.
    pub fn new(id: IdentityId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            status: IdentityStatus::Active,
            documents: Vec::new(),
            verification_level: VerificationLevel::Unverified,
            created_at: crate::time::now_micros(),
        }
    }

    /// Append a new, unverified document and return its position in the
    /// submission order.
    ///
    /// Unverified documents never count toward the level, so the level is
    /// unchanged by submission.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidState` unless the identity is active.
    pub fn submit_document(
        &mut self,
        doc_type: DocType,
        number: impl Into<String>,
        issuing_country: impl Into<String>,
        expiry: impl Into<String>,
    ) -> Result<usize> {
        self.ensure_active("submit document")?;

        self.documents
            .push(Document::new(doc_type, number, issuing_country, expiry));

        Ok(self.documents.len() - 1)
    }

    /// Verify the document matched by `selector` and recompute the level.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidState` unless the identity is active,
    /// or `RegistryError::NotFound` when no matching unverified document
    /// exists.
    pub fn verify_document(&mut self, selector: DocSelector) -> Result<VerifyOutcome> {
        self.ensure_active("verify document")?;

        let index = match selector {
            DocSelector::Index(i) => match self.documents.get(i) {
                Some(doc) if !doc.verified => i,
                Some(_) => {
                    return Err(RegistryError::NotFound(format!(
                        "document {i} of identity {} is already verified",
                        self.id
                    )))
                }
                None => {
                    return Err(RegistryError::NotFound(format!(
                        "identity {} has no document at index {i}",
                        self.id
                    )))
                }
            },
            DocSelector::Type(doc_type) => self
                .documents
                .iter()
                .position(|d| d.doc_type == doc_type && !d.verified)
                .ok_or_else(|| {
                    RegistryError::NotFound(format!(
                        "identity {} has no unverified {doc_type} document",
                        self.id
                    ))
                })?,
        };

        let previous_level = self.verification_level;
        let doc_type = self.documents[index].doc_type;
        self.documents[index].mark_verified(crate::time::now_micros());
        self.recompute_level();

        Ok(VerifyOutcome {
            index,
            doc_type,
            previous_level,
            level: self.verification_level,
        })
    }

    /// Move the identity to `suspended`.
    ///
    /// Suspending an already-suspended identity is a no-op at the state
    /// level but still reported, so the caller can keep a complete action
    /// history.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidState` when the identity is revoked.
    pub fn suspend(&mut self) -> Result<StatusChange> {
        match self.status {
            IdentityStatus::Revoked => Err(RegistryError::InvalidState(format!(
                "cannot suspend identity {}: revoked is terminal",
                self.id
            ))),
            IdentityStatus::Suspended => Ok(StatusChange::AlreadyInState),
            IdentityStatus::Active => {
                self.status = IdentityStatus::Suspended;
                Ok(StatusChange::Applied)
            }
        }
    }

    /// Move the identity to `revoked`. Terminal; never errors.
    ///
    /// Revoking an already-revoked identity is a no-op at the state level
    /// but still reported for history completeness.
    pub fn revoke(&mut self) -> StatusChange {
        match self.status {
            IdentityStatus::Revoked => StatusChange::AlreadyInState,
            _ => {
                self.status = IdentityStatus::Revoked;
                StatusChange::Applied
            }
        }
    }

    /// Move the identity back to `active` from `suspended`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidState` when the identity is revoked
    /// (cannot resurrect) or already active (nothing to reactivate).
    pub fn reactivate(&mut self) -> Result<()> {
        match self.status {
            IdentityStatus::Revoked => Err(RegistryError::InvalidState(format!(
                "cannot reactivate identity {}: revoked is terminal",
                self.id
            ))),
            IdentityStatus::Active => Err(RegistryError::InvalidState(format!(
                "identity {} is already active",
                self.id
            ))),
            IdentityStatus::Suspended => {
                self.status = IdentityStatus::Active;
                Ok(())
            }
        }
    }

    /// Number of verified documents.
    pub fn verified_document_count(&self) -> usize {
        self.documents.iter().filter(|d| d.verified).count()
    }

    /// Recompute the derived verification level from the document set.
    fn recompute_level(&mut self) {
        self.verification_level = level_for(&self.documents);
    }

    fn ensure_active(&self, action: &str) -> Result<()> {
        match self.status {
            IdentityStatus::Active => Ok(()),
            status => Err(RegistryError::InvalidState(format!(
                "cannot {action} for identity {}: status is {status}",
                self.id
            ))),
        }
    }
}
