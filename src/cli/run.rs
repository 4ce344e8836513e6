//! Run command - restore or populate the dependency cache

use crate::cache::{CacheEnv, Platform};
use crate::config::Settings;
use crate::error::{Stage, StageContext, StageError};
use crate::pipeline::{compute_key, Outcome, Pipeline};
use crate::store::create_store;
use crate::tools::CommandTools;
use crate::ui::UiContext;
use std::path::Path;
use tracing::{debug, info};

/// Print the cache key for `project_dir` without touching the store
///
/// Needs only the manifest and the key prefix, so it works before a
/// bucket is configured.
pub async fn print_key(project_dir: &Path, prefix: &str) -> Result<(), StageError> {
    let key = compute_key(project_dir, &Platform::detect(), prefix).await?;
    println!("{}", key);
    Ok(())
}

/// Execute a run against `project_dir`
pub async fn execute(settings: &Settings, project_dir: &Path) -> Result<(), StageError> {
    let ui = UiContext::detect();
    let store = create_store(&settings.store).await.stage(Stage::Configure)?;
    let tools = CommandTools::new(&settings.tools).stage(Stage::Configure)?;
    debug!("Using {} object store", store.backend_name());

    let env = CacheEnv {
        store: store.as_ref(),
        tools: &tools,
        ui: &ui,
        scratch_root: std::env::temp_dir(),
    };
    let pipeline = Pipeline::new(env, &settings.store);

    let report = pipeline.run(project_dir).await?;
    match report.outcome {
        Outcome::Restored => info!("Restored dependencies from {}", report.key),
        Outcome::Published => info!("Installed dependencies and published {}", report.key),
    }
    Ok(())
}
