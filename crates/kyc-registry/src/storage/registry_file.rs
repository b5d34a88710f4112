//! Registry snapshot file — versioned JSON on disk.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "identities": [ ... IdentityRecord, in creation order ... ],
//!     "audit": [ ... AuditEntry, in append order ... ]
//! }
//! ```
//!
//! Writes are atomic: the serialized JSON goes to a `.tmp` sibling in the
//! same directory and is then renamed over the target, so a crashed write
//! never leaves a truncated snapshot behind.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{RegistryError, Result};
use crate::identity::IdentityRecord;
use crate::registry::Registry;

const REGISTRY_FILE_VERSION: u32 = 1;

/// Top-level structure written to disk.
#[derive(Debug, Serialize, Deserialize)]
struct RegistryFile {
    /// Format version number.
    version: u32,
    /// Identity records in creation order.
    identities: Vec<IdentityRecord>,
    /// Audit entries in append order.
    audit: Vec<AuditEntry>,
}

/// Persist a registry snapshot to `path`.
///
/// # Errors
///
/// Returns `RegistryError::Serialization` if JSON serialization fails, or
/// `RegistryError::Io` for filesystem errors.
pub fn save_registry(registry: &Registry, path: &Path) -> Result<()> {
    let file = RegistryFile {
        version: REGISTRY_FILE_VERSION,
        identities: registry.list().into_iter().cloned().collect(),
        audit: registry.audit().entries().to_vec(),
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| RegistryError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json.as_bytes())?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

/// Load a registry snapshot from `path`.
///
/// # Errors
///
/// Returns `RegistryError::NotFound` when no file exists at `path`,
/// `RegistryError::InvalidFileFormat` if the file cannot be parsed or
/// carries an unsupported version, or `RegistryError::Io` for other
/// filesystem errors.
pub fn load_registry(path: &Path) -> Result<Registry> {
    if !path.exists() {
        return Err(RegistryError::NotFound(format!(
            "registry file not found: {}",
            path.display()
        )));
    }

    let bytes = std::fs::read(path)?;
    let file: RegistryFile = serde_json::from_slice(&bytes).map_err(|e| {
        RegistryError::InvalidFileFormat(format!(
            "failed to parse registry file {}: {e}",
            path.display()
        ))
    })?;

    if file.version != REGISTRY_FILE_VERSION {
        return Err(RegistryError::InvalidFileFormat(format!(
            "unsupported registry file version {}",
            file.version
        )));
    }

    Registry::from_parts(file.identities, file.audit)
}
