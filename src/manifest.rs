//! Package manifest loading
//!
//! Reads the subset of `package.json` that determines the installed
//! dependency tree: the project name and its declared dependencies.

use crate::error::{ModcacheError, ModcacheResult};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Manifest file name looked up in the project directory
pub const MANIFEST_FILE: &str = "package.json";

/// Parsed package manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Project name, used in the archive file name
    pub name: String,

    /// Runtime dependencies (name -> version range)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependencies: HashMap<String, String>,

    /// Development-only dependencies (name -> version range)
    #[serde(default, rename = "devDependencies", deserialize_with = "null_as_empty")]
    pub dev_dependencies: HashMap<String, String>,
}

/// Accept `null` for a dependency map and treat it as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<HashMap<String, String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Manifest {
    /// Path of the manifest inside a project directory
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(MANIFEST_FILE)
    }

    /// Load and parse the manifest from a project directory
    pub async fn load(project_dir: &Path) -> ModcacheResult<Self> {
        let path = Self::path_in(project_dir);
        let content = fs::read(&path)
            .await
            .map_err(|e| ModcacheError::ManifestRead {
                path: path.clone(),
                source: e,
            })?;

        let manifest: Manifest =
            serde_json::from_slice(&content).map_err(|e| ModcacheError::ManifestParse {
                path: path.clone(),
                source: e,
            })?;

        debug!(
            "Loaded manifest {} ({} dependencies, {} dev dependencies)",
            manifest.name,
            manifest.dependencies.len(),
            manifest.dev_dependencies.len()
        );
        Ok(manifest)
    }

    /// All declared dependencies, runtime first then development
    pub fn all_dependencies(&self) -> impl Iterator<Item = (&String, &String)> {
        self.dependencies.iter().chain(self.dev_dependencies.iter())
    }
}
