//! Dependency fingerprinting for content-addressed caching
//!
//! Hashes the declared dependency set of a manifest. Same dependencies =
//! same fingerprint, independent of declaration order or of whether a
//! package is listed as a runtime or development dependency.

use crate::manifest::Manifest;
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA256 digest of a manifest's dependency set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a manifest's dependencies
    ///
    /// Each dependency is rendered as `"<name>: <version>"`, the list is
    /// sorted and the entries are hashed back to back with no separator.
    pub fn of(manifest: &Manifest) -> Self {
        let mut entries: Vec<String> = manifest
            .all_dependencies()
            .map(|(name, version)| format!("{}: {}", name, version))
            .collect();
        entries.sort();

        let mut hasher = Sha256::new();
        for entry in &entries {
            hasher.update(entry.as_bytes());
        }

        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(hex: String) -> Self {
        Self(hex)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
