//! Amazon S3 object store backend
//!
//! Credentials and region come from the standard AWS environment
//! (env vars, profiles, instance metadata). An explicit endpoint URL
//! switches to path-style addressing for S3-compatible stores.

use crate::error::{ModcacheError, ModcacheResult};
use crate::store::{Object, ObjectStore};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tracing::debug;

/// S3 client scoped to one run
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client from the environment, with optional overrides
    pub async fn from_env(region: Option<String>, endpoint_url: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(url) = endpoint_url {
            debug!("Using S3 endpoint {}", url);
            builder = builder.endpoint_url(url).force_path_style(true);
        }

        Self::with_client(Client::from_conf(builder.build()))
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> ModcacheResult<Object> {
        debug!("GetObject s3://{}/{}", bucket, key);

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ModcacheError::ObjectGet {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let content_length = output.content_length().and_then(|n| u64::try_from(n).ok());

        Ok(Object {
            body: Box::pin(output.body.into_async_read()),
            content_length,
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> ModcacheResult<()> {
        debug!("PutObject s3://{}/{} from {}", bucket, key, path.display());

        let body = ByteStream::from_path(path).await.map_err(|e| {
            ModcacheError::io(
                format!("opening {} for upload", path.display()),
                std::io::Error::other(e),
            )
        })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| ModcacheError::ObjectPut {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
