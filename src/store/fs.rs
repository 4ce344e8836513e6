//! Local directory object store backend
//!
//! Objects are plain files at `<root>/<bucket>/<key>`.

use crate::error::{ModcacheError, ModcacheResult};
use crate::store::{Object, ObjectStore};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Object store backed by a local directory tree
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the file path of an object, rejecting keys that escape the root
    pub fn object_path(&self, bucket: &str, key: &str) -> Option<PathBuf> {
        let relative = Path::new(bucket).join(key);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if bucket.is_empty() || key.is_empty() || !contained {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn invalid_key(bucket: &str, key: &str) -> String {
        format!("invalid object location {}/{}", bucket, key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> ModcacheResult<Object> {
        let get_error = |reason: String| ModcacheError::ObjectGet {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let path = self
            .object_path(bucket, key)
            .ok_or_else(|| get_error(Self::invalid_key(bucket, key)))?;
        debug!("Reading object {}", path.display());

        let file = fs::File::open(&path)
            .await
            .map_err(|e| get_error(e.to_string()))?;
        let content_length = file.metadata().await.ok().map(|m| m.len());

        Ok(Object {
            body: Box::pin(file),
            content_length,
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> ModcacheResult<()> {
        let put_error = |reason: String| ModcacheError::ObjectPut {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let dest = self
            .object_path(bucket, key)
            .ok_or_else(|| put_error(Self::invalid_key(bucket, key)))?;
        debug!("Writing object {}", dest.display());

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| put_error(e.to_string()))?;
        }
        fs::copy(path, &dest)
            .await
            .map_err(|e| put_error(e.to_string()))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
