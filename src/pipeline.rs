//! Cache restore pipeline
//!
//! One run: load manifest, fingerprint, build key, try the cache, and on
//! a miss install and publish. Misses are never fatal; any other failure
//! stops the run with the stage it happened in.

use crate::cache::{self, CacheEnv, CacheKey, FetchOutcome, Fingerprint, Platform};
use crate::config::StoreSettings;
use crate::error::{Stage, StageContext, StageError};
use crate::manifest::Manifest;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Pipeline progress, logged at debug level as the run advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    ManifestLoaded,
    FingerprintComputed,
    KeyComputed,
    CacheHit,
    CacheMiss,
    Published,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ManifestLoaded => "manifest-loaded",
            Self::FingerprintComputed => "fingerprint-computed",
            Self::KeyComputed => "key-computed",
            Self::CacheHit => "cache-hit",
            Self::CacheMiss => "cache-miss",
            Self::Published => "published",
        };
        write!(f, "{}", name)
    }
}

/// How a successful run satisfied the project's dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Dependencies restored from a cached archive
    Restored,
    /// Cache missed; dependencies installed and a new archive uploaded
    Published,
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub key: CacheKey,
    pub outcome: Outcome,
}

/// Load a project's manifest and compute its cache key
pub async fn compute_key(
    project_dir: &Path,
    platform: &Platform,
    prefix: &str,
) -> Result<CacheKey, StageError> {
    let manifest = Manifest::load(project_dir)
        .await
        .stage(Stage::LoadManifest)?;
    debug!(state = %RunState::ManifestLoaded, name = %manifest.name);

    let fingerprint = Fingerprint::of(&manifest);
    debug!(state = %RunState::FingerprintComputed, %fingerprint);

    let key = CacheKey::new(&manifest.name, &fingerprint, platform, prefix);
    debug!(state = %RunState::KeyComputed, %key);
    Ok(key)
}

/// Restore-or-populate pipeline for one project
pub struct Pipeline<'a> {
    env: CacheEnv<'a>,
    store: &'a StoreSettings,
    platform: Platform,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline for the host platform
    pub fn new(env: CacheEnv<'a>, store: &'a StoreSettings) -> Self {
        Self {
            env,
            store,
            platform: Platform::detect(),
        }
    }

    /// Override the platform used in cache keys
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Load the manifest and compute its cache key
    pub async fn cache_key(&self, project_dir: &Path) -> Result<CacheKey, StageError> {
        compute_key(project_dir, &self.platform, &self.store.prefix).await
    }

    /// Run the full pipeline against a project directory
    pub async fn run(&self, project_dir: &Path) -> Result<RunReport, StageError> {
        let key = self.cache_key(project_dir).await?;

        let fetched = cache::fetch(&self.env, &self.store.bucket, &key, project_dir)
            .await
            .stage(Stage::Fetch)?;

        match fetched {
            FetchOutcome::Hit => {
                debug!(state = %RunState::CacheHit);
                Ok(RunReport {
                    key,
                    outcome: Outcome::Restored,
                })
            }
            FetchOutcome::Miss { reason } => {
                debug!(state = %RunState::CacheMiss, %reason);
                info!("Cache miss for {}, installing dependencies", key);

                cache::install_and_publish(&self.env, project_dir, &self.store.upload_bucket, &key)
                    .await?;
                debug!(state = %RunState::Published);

                Ok(RunReport {
                    key,
                    outcome: Outcome::Published,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::{Call, FakeTools};
    use crate::error::ModcacheError;
    use crate::manifest::MANIFEST_FILE;
    use crate::store::FsObjectStore;
    use crate::ui::UiContext;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        root: TempDir,
        store: FsObjectStore,
        ui: UiContext,
        settings: StoreSettings,
    }

    impl Fixture {
        fn new(manifest: &str) -> Self {
            let root = TempDir::new().unwrap();
            fs::create_dir_all(root.path().join("scratch")).unwrap();
            fs::create_dir_all(root.path().join("project")).unwrap();
            fs::write(root.path().join("project").join(MANIFEST_FILE), manifest).unwrap();
            let store = FsObjectStore::new(root.path().join("store"));
            let settings = StoreSettings {
                bucket: "cache".to_string(),
                upload_bucket: "cache".to_string(),
                prefix: "node_modules".to_string(),
                region: None,
                endpoint_url: None,
                local_root: None,
            };
            Self {
                root,
                store,
                ui: UiContext::non_interactive(),
                settings,
            }
        }

        fn project(&self) -> PathBuf {
            self.root.path().join("project")
        }

        fn pipeline<'a>(&'a self, tools: &'a FakeTools) -> Pipeline<'a> {
            let env = CacheEnv {
                store: &self.store,
                tools,
                ui: &self.ui,
                scratch_root: self.root.path().join("scratch"),
            };
            Pipeline::new(env, &self.settings).with_platform(Platform::new("linux", "amd64"))
        }

        fn object(&self, bucket: &str, key: &CacheKey) -> PathBuf {
            self.root.path().join("store").join(bucket).join(key.to_string())
        }
    }

    const APP_MANIFEST: &str = r#"{"name": "app", "dependencies": {"left-pad": "^1.0.0"}}"#;

    #[tokio::test]
    async fn key_for_app_manifest() {
        let fx = Fixture::new(APP_MANIFEST);
        let tools = FakeTools::default();

        let key = fx.pipeline(&tools).cache_key(&fx.project()).await.unwrap();

        let fingerprint = Fingerprint::of(&Manifest::load(&fx.project()).await.unwrap());
        assert_eq!(
            key.to_string(),
            format!("node_modules/app-{}-linux-amd64.tar.gz", fingerprint)
        );
    }

    #[tokio::test]
    async fn empty_dependencies_give_well_formed_key() {
        let fx = Fixture::new(r#"{"name": "empty"}"#);
        let tools = FakeTools::default();

        let key = fx.pipeline(&tools).cache_key(&fx.project()).await.unwrap();
        assert_eq!(
            key.to_string(),
            "node_modules/empty-e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855-linux-amd64.tar.gz"
        );
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let fx = Fixture::new(APP_MANIFEST);

        let first_tools = FakeTools::default();
        let first = fx.pipeline(&first_tools).run(&fx.project()).await.unwrap();
        assert_eq!(first.outcome, Outcome::Published);
        assert_eq!(
            first_tools.calls(),
            vec![Call::Install(fx.project()), Call::Archive(fx.project())]
        );
        assert!(fx.object("cache", &first.key).is_file());

        // Unchanged manifest on the same platform must hit
        let second_tools = FakeTools::default();
        let second = fx.pipeline(&second_tools).run(&fx.project()).await.unwrap();
        assert_eq!(second.outcome, Outcome::Restored);
        assert_eq!(second.key, first.key);
        assert_eq!(second_tools.calls(), vec![Call::Extract(fx.project())]);
    }

    #[tokio::test]
    async fn scoped_package_miss_then_hit() {
        let fx = Fixture::new(r#"{"name": "@acme/web", "dependencies": {"left-pad": "^1.0.0"}}"#);

        let first_tools = FakeTools::default();
        let first = fx.pipeline(&first_tools).run(&fx.project()).await.unwrap();
        assert_eq!(first.outcome, Outcome::Published);
        assert!(first.key.to_string().starts_with("node_modules/@acme/web-"));
        assert!(fx.object("cache", &first.key).is_file());
        let archive = &first_tools.archive_paths()[0];
        assert!(archive
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("@acme_web-"));

        let second_tools = FakeTools::default();
        let second = fx.pipeline(&second_tools).run(&fx.project()).await.unwrap();
        assert_eq!(second.outcome, Outcome::Restored);
        assert_eq!(second.key, first.key);
    }

    #[tokio::test]
    async fn dependency_change_misses_again() {
        let fx = Fixture::new(APP_MANIFEST);
        let tools = FakeTools::default();
        let first = fx.pipeline(&tools).run(&fx.project()).await.unwrap();

        fs::write(
            fx.project().join(MANIFEST_FILE),
            r#"{"name": "app", "dependencies": {"left-pad": "^1.1.0"}}"#,
        )
        .unwrap();

        let tools = FakeTools::default();
        let second = fx.pipeline(&tools).run(&fx.project()).await.unwrap();
        assert_eq!(second.outcome, Outcome::Published);
        assert_ne!(second.key, first.key);
    }

    #[tokio::test]
    async fn installer_failure_aborts_without_upload() {
        let fx = Fixture::new(APP_MANIFEST);
        let tools = FakeTools {
            fail_install: true,
            ..FakeTools::default()
        };
        let pipeline = fx.pipeline(&tools);
        let key = pipeline.cache_key(&fx.project()).await.unwrap();

        let err = pipeline.run(&fx.project()).await.unwrap_err();

        assert_eq!(err.stage, Stage::Install);
        assert_eq!(tools.calls(), vec![Call::Install(fx.project())]);
        assert!(!fx.object("cache", &key).exists());
    }

    #[tokio::test]
    async fn corrupt_archive_is_fatal_fetch_error() {
        let fx = Fixture::new(APP_MANIFEST);
        let tools = FakeTools {
            fail_extract: true,
            ..FakeTools::default()
        };
        let pipeline = fx.pipeline(&tools);
        let key = pipeline.cache_key(&fx.project()).await.unwrap();
        let object = fx.object("cache", &key);
        fs::create_dir_all(object.parent().unwrap()).unwrap();
        fs::write(&object, b"garbage").unwrap();

        let err = pipeline.run(&fx.project()).await.unwrap_err();

        assert_eq!(err.stage, Stage::Fetch);
        assert_eq!(tools.calls(), vec![Call::Extract(fx.project())]);
    }

    #[tokio::test]
    async fn missing_manifest_is_load_failure() {
        let fx = Fixture::new(APP_MANIFEST);
        fs::remove_file(fx.project().join(MANIFEST_FILE)).unwrap();
        let tools = FakeTools::default();

        let err = fx.pipeline(&tools).run(&fx.project()).await.unwrap_err();

        assert_eq!(err.stage, Stage::LoadManifest);
        assert!(matches!(err.source, ModcacheError::ManifestRead { .. }));
        assert!(tools.calls().is_empty());
    }

    #[tokio::test]
    async fn upload_goes_to_upload_bucket() {
        let mut fx = Fixture::new(APP_MANIFEST);
        fx.settings.upload_bucket = "cache-write".to_string();
        let tools = FakeTools::default();

        let report = fx.pipeline(&tools).run(&fx.project()).await.unwrap();

        assert!(fx.object("cache-write", &report.key).is_file());
        assert!(!fx.object("cache", &report.key).exists());
    }
}
