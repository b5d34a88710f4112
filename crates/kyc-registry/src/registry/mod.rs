//! Identity registry — owns the identity records and the audit log.

pub mod projections;
#[allow(clippy::module_inception)]
pub mod registry;

pub use projections::{IdentityReport, IdentitySummary, RegistryStats};
pub use registry::Registry;
