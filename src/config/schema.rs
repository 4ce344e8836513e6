//! Configuration schema for modcache
//!
//! Global configuration is stored at `~/.config/modcache/config.toml`;
//! a project may add a `.modcache.toml` next to its `package.json`.
//! Every field is optional so layers can be merged.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Object store settings
    pub store: StoreConfig,

    /// External tool settings
    pub tools: ToolsConfig,
}

impl Config {
    /// Overlay `other` on top of `self`; values set in `other` win
    pub fn merge(self, other: Config) -> Config {
        Config {
            general: GeneralConfig {
                log_format: other.general.log_format.or(self.general.log_format),
            },
            store: StoreConfig {
                bucket: other.store.bucket.or(self.store.bucket),
                upload_bucket: other.store.upload_bucket.or(self.store.upload_bucket),
                prefix: other.store.prefix.or(self.store.prefix),
                region: other.store.region.or(self.store.region),
                endpoint_url: other.store.endpoint_url.or(self.store.endpoint_url),
                local_root: other.store.local_root.or(self.store.local_root),
            },
            tools: ToolsConfig {
                install_command: other.tools.install_command.or(self.tools.install_command),
                archiver: other.tools.archiver.or(self.tools.archiver),
                dependency_dir: other.tools.dependency_dir.or(self.tools.dependency_dir),
            },
        }
    }
}

/// General application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: Option<String>,
}

/// Object store configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Bucket cached archives are looked up in
    pub bucket: Option<String>,

    /// Bucket new archives are uploaded to (defaults to `bucket`)
    pub upload_bucket: Option<String>,

    /// Object key prefix
    pub prefix: Option<String>,

    /// AWS region override
    pub region: Option<String>,

    /// Custom S3-compatible endpoint
    pub endpoint_url: Option<String>,

    /// Use a local directory instead of S3
    pub local_root: Option<PathBuf>,
}

/// External tool configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Installer command line (default: `npm install -q`)
    pub install_command: Option<Vec<String>>,

    /// Archiver program (default: `tar`)
    pub archiver: Option<String>,

    /// Dependency directory to archive (default: `node_modules`)
    pub dependency_dir: Option<String>,
}
