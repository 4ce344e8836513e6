//! Configuration management for modcache
//!
//! Layers, lowest precedence first: built-in defaults, the global config
//! file, the project-local `.modcache.toml`, command-line flags.

pub mod schema;

pub use schema::Config;

use crate::error::{ModcacheError, ModcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".modcache.toml";

/// Default object key prefix
pub const DEFAULT_PREFIX: &str = "node_modules";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("modcache")
            .join("config.toml")
    }

    /// Find the project-local config file, if present
    pub fn find_local_config(project_dir: &Path) -> Option<PathBuf> {
        let path = project_dir.join(LOCAL_CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> ModcacheResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        Self::load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(path: &Path) -> ModcacheResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ModcacheError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| ModcacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the global config with an optional local config layered on top
    pub async fn load_merged(&self, local: Option<&Path>) -> ModcacheResult<Config> {
        let global = self.load().await?;
        match local {
            Some(path) => {
                debug!("Merging local config: {}", path.display());
                let local = Self::load_from_file(path).await?;
                Ok(global.merge(local))
            }
            None => Ok(global),
        }
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parse the `general.log_format` value, defaulting to text
    pub fn parse(value: Option<&str>) -> ModcacheResult<Self> {
        match value {
            None | Some("text") => Ok(Self::Text),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(ModcacheError::ConfigValue(format!(
                "general.log_format must be \"text\" or \"json\", got {:?}",
                other
            ))),
        }
    }
}

/// Object key prefix from a merged config, before bucket resolution
pub fn key_prefix(config: &Config) -> String {
    config
        .store
        .prefix
        .clone()
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_format: LogFormat,
    pub store: StoreSettings,
    pub tools: ToolSettings,
}

/// Resolved object store settings
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub bucket: String,
    pub upload_bucket: String,
    pub prefix: String,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub local_root: Option<PathBuf>,
}

/// Resolved external tool settings
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub install_command: Vec<String>,
    pub archiver: String,
    pub dependency_dir: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            install_command: vec!["npm".to_string(), "install".to_string(), "-q".to_string()],
            archiver: "tar".to_string(),
            dependency_dir: "node_modules".to_string(),
        }
    }
}

impl Settings {
    /// Resolve a merged config into run settings
    ///
    /// The lookup bucket is required. The upload bucket falls back to it.
    pub fn resolve(config: Config) -> ModcacheResult<Self> {
        let log_format = LogFormat::parse(config.general.log_format.as_deref())?;
        let prefix = key_prefix(&config);

        let bucket = config
            .store
            .bucket
            .filter(|b| !b.is_empty())
            .ok_or(ModcacheError::MissingBucket)?;
        let upload_bucket = config
            .store
            .upload_bucket
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| bucket.clone());

        let defaults = ToolSettings::default();
        let tools = ToolSettings {
            install_command: config.tools.install_command.unwrap_or(defaults.install_command),
            archiver: config.tools.archiver.unwrap_or(defaults.archiver),
            dependency_dir: config.tools.dependency_dir.unwrap_or(defaults.dependency_dir),
        };

        Ok(Self {
            log_format,
            store: StoreSettings {
                bucket,
                upload_bucket,
                prefix,
                region: config.store.region,
                endpoint_url: config.store.endpoint_url,
                local_root: config.store.local_root,
            },
            tools,
        })
    }
}
