//! modcache - dependency cache accelerator
//!
//! CLI entry point: resolves configuration, sets up logging and runs the
//! restore pipeline.

use clap::Parser;
use console::style;
use modcache::cli::Cli;
use modcache::config::{key_prefix, ConfigManager, LogFormat, Settings};
use modcache::error::{ModcacheError, Stage, StageContext, StageError};
use std::error::Error;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            let mut cause = e.source();
            while let Some(inner) = cause {
                eprintln!("  {} {}", style("Caused by:").dim(), inner);
                cause = inner.source();
            }
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StageError> {
    let cli = Cli::parse();

    let project_dir = match cli.directory.clone() {
        Some(dir) => dir,
        None => std::env::current_dir()
            .map_err(|e| ModcacheError::io("getting current directory", e))
            .stage(Stage::Configure)?,
    };

    // Load configuration: global, then project-local, then flags
    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        ConfigManager::find_local_config(&project_dir)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await
        .stage(Stage::Configure)?
        .merge(cli.overrides());

    let log_format =
        LogFormat::parse(config.general.log_format.as_deref()).stage(Stage::Configure)?;
    init_logging(cli.verbose, log_format);
    debug!("Config file: {}", config_manager.path().display());
    if let Some(ref path) = local_config_path {
        debug!("Found local config: {}", path.display());
    }
    debug!("Project directory: {}", project_dir.display());

    // Key printing never talks to the store, so no bucket is required
    if cli.print_key {
        return modcache::cli::run::print_key(&project_dir, &key_prefix(&config)).await;
    }

    let settings = Settings::resolve(config).stage(Stage::Configure)?;
    modcache::cli::run::execute(&settings, &project_dir).await
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::new("modcache=warn"),
        1 => EnvFilter::new("modcache=info"),
        _ => EnvFilter::new("modcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.without_time().init(),
        LogFormat::Json => builder.json().init(),
    }
}
