//! Identity records: status lifecycle, documents, and the derived
//! verification level.

pub mod level;
pub mod record;

pub use level::{level_for, VerificationLevel};
pub use record::{
    DocSelector, IdentityId, IdentityRecord, IdentityStatus, StatusChange, VerifyOutcome,
};
