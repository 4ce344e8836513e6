//! Object store abstraction
//!
//! Cache archives live in a bucket/key blob store. The pipeline only
//! talks to the [`ObjectStore`] trait so the S3 client can be swapped
//! for a local directory (offline runs, tests).

mod fs;
mod s3;

pub use fs::FsObjectStore;
pub use s3::S3ObjectStore;

use crate::config::StoreSettings;
use crate::error::ModcacheResult;
use async_trait::async_trait;
use std::path::Path;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tracing::debug;

/// Streaming body of a fetched object
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// A fetched object
pub struct Object {
    /// Object contents
    pub body: ObjectBody,
    /// Size in bytes, when the store reports it
    pub content_length: Option<u64>,
}

/// Abstract bucket/key object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object. Absent objects and access failures are errors.
    async fn get_object(&self, bucket: &str, key: &str) -> ModcacheResult<Object>;

    /// Upload a local file as an object
    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> ModcacheResult<()>;

    /// Get the human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Create the object store selected by the settings
///
/// A configured `local_root` selects the directory backend, otherwise an
/// S3 client is built from the environment.
pub async fn create_store(settings: &StoreSettings) -> ModcacheResult<Box<dyn ObjectStore>> {
    if let Some(root) = &settings.local_root {
        debug!("Using local object store at {}", root.display());
        return Ok(Box::new(FsObjectStore::new(root.clone())));
    }

    let store =
        S3ObjectStore::from_env(settings.region.clone(), settings.endpoint_url.clone()).await;
    Ok(Box::new(store))
}
