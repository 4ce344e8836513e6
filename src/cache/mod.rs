//! Remote dependency cache
//!
//! Archives of an installed dependency directory are stored under a key
//! derived from the manifest's dependency fingerprint and the host
//! platform. Same dependencies on the same platform = same archive.
//!
//! # Flow
//!
//! | Step | Outcome |
//! |------|---------|
//! | Fetch | Hit: archive extracted, done |
//! | Fetch | Miss: fall back to publish |
//! | Publish | Install, archive, upload |
//!
//! Local archive copies live in a per-run scratch directory that is
//! removed when the operation returns, on success or failure.

pub mod fetch;
pub mod fingerprint;
pub mod key;
pub mod publish;

pub use fetch::{fetch, FetchOutcome};
pub use fingerprint::Fingerprint;
pub use key::{CacheKey, Platform};
pub use publish::install_and_publish;

use crate::error::{ModcacheError, ModcacheResult};
use crate::store::ObjectStore;
use crate::tools::DependencyTools;
use crate::ui::UiContext;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Collaborators shared by cache operations
pub struct CacheEnv<'a> {
    /// Object store holding archives
    pub store: &'a dyn ObjectStore,
    /// Installer and archiver
    pub tools: &'a dyn DependencyTools,
    /// Output context for progress display
    pub ui: &'a UiContext,
    /// Directory scratch directories are created in
    pub scratch_root: PathBuf,
}

impl CacheEnv<'_> {
    /// Create a scratch directory for one archive
    ///
    /// The directory name embeds the archive name so concurrent runs for
    /// different projects never share a temporary path.
    pub(crate) fn scratch_dir(&self, key: &CacheKey) -> ModcacheResult<TempDir> {
        scratch_dir_in(&self.scratch_root, key)
    }
}

fn scratch_dir_in(root: &Path, key: &CacheKey) -> ModcacheResult<TempDir> {
    tempfile::Builder::new()
        .prefix(&format!("modcache-{}-", key.local_file_name()))
        .tempdir_in(root)
        .map_err(|e| {
            ModcacheError::io(
                format!("creating temporary directory in {}", root.display()),
                e,
            )
        })
}
