//! External dependency tooling
//!
//! The installer and archiver are external programs. The pipeline only
//! sees the narrow [`DependencyTools`] trait so tests can substitute
//! fakes for real subprocesses.

mod command;

pub use command::CommandTools;

use crate::error::ModcacheResult;
use async_trait::async_trait;
use std::path::Path;

/// Install, archive and extract a project's dependency directory
#[async_trait]
pub trait DependencyTools: Send + Sync {
    /// Install dependencies in the project directory
    async fn install(&self, project_dir: &Path) -> ModcacheResult<()>;

    /// Compress the project's dependency directory into `archive`
    async fn archive(&self, project_dir: &Path, archive: &Path) -> ModcacheResult<()>;

    /// Unpack `archive` into `target_dir`
    async fn extract(&self, archive: &Path, target_dir: &Path) -> ModcacheResult<()>;
}
