//! Cache population: install, archive and upload on a miss

use crate::cache::{CacheEnv, CacheKey};
use crate::error::{Stage, StageContext, StageError};
use std::path::Path;
use tracing::info;

/// Install dependencies and publish them under `key`
///
/// Steps run strictly in order and the first failure aborts the rest, so
/// a failed install never uploads anything.
pub async fn install_and_publish(
    env: &CacheEnv<'_>,
    project_dir: &Path,
    upload_bucket: &str,
    key: &CacheKey,
) -> Result<(), StageError> {
    env.tools.install(project_dir).await.stage(Stage::Install)?;

    let scratch = env.scratch_dir(key).stage(Stage::Archive)?;
    let archive_path = scratch.path().join(key.local_file_name());
    env.tools
        .archive(project_dir, &archive_path)
        .await
        .stage(Stage::Archive)?;

    let object_key = key.as_object_key();
    info!("Uploading {} to bucket {}", object_key, upload_bucket);
    env.store
        .put_object(upload_bucket, &object_key, &archive_path)
        .await
        .stage(Stage::Upload)?;

    info!("Published cached modules as {}", object_key);
    Ok(())
}
