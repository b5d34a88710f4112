//! Verification level rule.
//!
//! The level is derived from the current document set and nothing else.
//! It is recomputed after every document verification; callers can never
//! set it directly.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Trust tier derived from verified documentary evidence.
///
/// Wire tokens are fixed: `unverified`, `basic`, `standard`, `enhanced`.
/// The derive order gives `Ord`: `Unverified < Basic < Standard < Enhanced`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    #[default]
    Unverified,
    Basic,
    Standard,
    Enhanced,
}

impl VerificationLevel {
    /// All levels, lowest first.
    pub const ALL: [VerificationLevel; 4] = [
        VerificationLevel::Unverified,
        VerificationLevel::Basic,
        VerificationLevel::Standard,
        VerificationLevel::Enhanced,
    ];

    /// Return the stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Enhanced => "enhanced",
        }
    }
}

impl std::fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// Compute the verification level for a document set.
///
/// Evaluated in descending order, first match wins:
///
/// - `enhanced`: at least 3 verified documents, of which at least one is
///   a primary type. The primary requirement is a hard gate: three
///   verified utility bills are `standard`, not `enhanced`.
/// - `standard`: at least 2 verified documents.
/// - `basic`: at least 1 verified document.
/// - `unverified`: otherwise.
///
/// Unverified documents never count.
pub fn level_for(documents: &[Document]) -> VerificationLevel {
    let verified = documents.iter().filter(|d| d.verified).count();
    let has_primary = documents
        .iter()
        .any(|d| d.verified && d.doc_type.is_primary());

    if verified >= 3 && has_primary {
        VerificationLevel::Enhanced
    } else if verified >= 2 {
        VerificationLevel::Standard
    } else if verified >= 1 {
        VerificationLevel::Basic
    } else {
        VerificationLevel::Unverified
    }
}
