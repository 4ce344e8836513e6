//! Remote cache key construction
//!
//! Keys look like `<prefix>/<name>-<fingerprint>-<os>-<arch>.tar.gz`.
//! Platform identifiers are part of the key so archives built on one
//! platform are never restored on another.

use crate::cache::fingerprint::Fingerprint;
use std::fmt;

/// File extension of cache archives
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Host platform identifiers used in cache keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the current platform
    pub fn detect() -> Self {
        Self::new(
            os_identifier(std::env::consts::OS),
            arch_identifier(std::env::consts::ARCH),
        )
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Map a Rust OS name to the conventional identifier used in archive names
fn os_identifier(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

/// Map a Rust architecture name to the conventional identifier used in archive names
fn arch_identifier(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

/// Location of a cache entry in the object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    prefix: String,
    archive_name: String,
}

impl CacheKey {
    /// Build the key for a project's dependency archive
    pub fn new(name: &str, fingerprint: &Fingerprint, platform: &Platform, prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
            archive_name: format!(
                "{}-{}-{}-{}.{}",
                name, fingerprint, platform.os, platform.arch, ARCHIVE_EXTENSION
            ),
        }
    }

    /// Archive file name, without the prefix
    pub fn archive_name(&self) -> &str {
        &self.archive_name
    }

    /// Archive name usable as a single local path component
    ///
    /// Scoped package names (`@scope/name`) contain `/`, which is fine in
    /// an object key but not in a file name.
    pub fn local_file_name(&self) -> String {
        self.archive_name.replace(['/', '\\'], "_")
    }

    /// Full object key
    pub fn as_object_key(&self) -> String {
        if self.prefix.is_empty() {
            self.archive_name.clone()
        } else {
            format!("{}/{}", self.prefix, self.archive_name)
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_object_key())
    }
}
