//! Submitted documents and their verification status.
//!
//! A document enters the registry unverified. The `verified` flag is set
//! only by an explicit verify action; nothing flips it implicitly.

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Type of identity document.
///
/// The wire tokens are part of the external contract and must not change:
/// `passport`, `license`, `national_id`, `utility_bill`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Passport,
    License,
    NationalId,
    UtilityBill,
}

impl DocType {
    /// All document types, in declaration order.
    pub const ALL: [DocType; 4] = [
        DocType::Passport,
        DocType::License,
        DocType::NationalId,
        DocType::UtilityBill,
    ];

    /// Return the stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::License => "license",
            Self::NationalId => "national_id",
            Self::UtilityBill => "utility_bill",
        }
    }

    /// Parse a document type from its wire tag.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "passport" => Ok(Self::Passport),
            "license" => Ok(Self::License),
            "national_id" => Ok(Self::NationalId),
            "utility_bill" => Ok(Self::UtilityBill),
            other => Err(RegistryError::Validation(format!(
                "unknown document type '{other}' (expected passport, license, national_id, or utility_bill)"
            ))),
        }
    }

    /// Whether this type counts as strong identity proof.
    ///
    /// Primary documents gate the `enhanced` verification level; a utility
    /// bill is supporting evidence only.
    pub fn is_primary(&self) -> bool {
        !matches!(self, Self::UtilityBill)
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

impl std::str::FromStr for DocType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

/// A single submitted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_type: DocType,
    /// Document number as printed on the document.
    pub number: String,
    /// ISO country code or free-form issuer name.
    pub issuing_country: String,
    /// Expiry date as supplied by the holder (not validated here).
    pub expiry: String,
    pub verified: bool,
    /// When the document was verified (microseconds since Unix epoch).
    pub verified_at: Option<u64>,
    /// When the document was submitted (microseconds since Unix epoch).
    pub submitted_at: u64,
}

impl Document {
    /// Create a new, unverified document submitted now.
    pub fn new(
        doc_type: DocType,
        number: impl Into<String>,
        issuing_country: impl Into<String>,
        expiry: impl Into<String>,
    ) -> Self {
        Self {
            doc_type,
            number: number.into(),
            issuing_country: issuing_country.into(),
            expiry: expiry.into(),
            verified: false,
            verified_at: None,
            submitted_at: crate::time::now_micros(),
        }
    }

    /// Mark this document verified at the given time.
    pub(crate) fn mark_verified(&mut self, at: u64) {
        self.verified = true;
        self.verified_at = Some(at);
    }
}
