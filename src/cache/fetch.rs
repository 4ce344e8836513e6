//! Cache lookup: download and unpack a cached archive

use crate::cache::{CacheEnv, CacheKey};
use crate::error::{ModcacheError, ModcacheResult};
use crate::store::Object;
use crate::ui::TransferProgress;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Read buffer size for archive downloads
const DOWNLOAD_CHUNK: usize = 64 * 1024;

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Archive found and extracted into the target directory
    Hit,
    /// Archive could not be fetched; the caller should fall back
    Miss { reason: String },
}

/// Try to restore `key` from `bucket` into `target_dir`
///
/// Any failure to get the object is a miss, not an error. Once the
/// object is being received, write and extraction failures are fatal:
/// they point at a broken archive rather than a missing one.
pub async fn fetch(
    env: &CacheEnv<'_>,
    bucket: &str,
    key: &CacheKey,
    target_dir: &Path,
) -> ModcacheResult<FetchOutcome> {
    let object_key = key.as_object_key();

    let object = match env.store.get_object(bucket, &object_key).await {
        Ok(object) => object,
        Err(e) => {
            warn!("Could not get cached modules: {}", e);
            return Ok(FetchOutcome::Miss {
                reason: e.to_string(),
            });
        }
    };

    let scratch = env.scratch_dir(key)?;
    let local_path = scratch.path().join(key.local_file_name());

    info!("Downloading {}", object_key);
    let written = download(env, object, key.archive_name(), &local_path).await?;
    debug!("Wrote {} bytes to {}", written, local_path.display());

    env.tools.extract(&local_path, target_dir).await?;
    info!("Restored cached modules from {}", object_key);

    Ok(FetchOutcome::Hit)
}

/// Stream an object body into a local file, returning the byte count
async fn download(
    env: &CacheEnv<'_>,
    object: Object,
    label: &str,
    path: &Path,
) -> ModcacheResult<u64> {
    let read_error =
        |e| ModcacheError::io(format!("reading cached archive body for {}", label), e);
    let write_error = |e| {
        ModcacheError::io(
            format!("writing temporary cache file {}", path.display()),
            e,
        )
    };

    let mut file = File::create(path).await.map_err(|e| {
        ModcacheError::io(
            format!("creating temporary cache file {}", path.display()),
            e,
        )
    })?;

    let progress = TransferProgress::new(env.ui, label, object.content_length);
    let mut body = object.body;
    let mut buf = vec![0u8; DOWNLOAD_CHUNK];
    let mut written = 0u64;

    loop {
        let n = body.read(&mut buf).await.map_err(read_error)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await.map_err(write_error)?;
        written += n as u64;
        progress.advance(n as u64);
    }

    file.flush().await.map_err(write_error)?;
    progress.finish();
    Ok(written)
}
