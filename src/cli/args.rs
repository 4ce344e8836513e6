//! CLI argument definitions using clap derive

use crate::config::Config;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// modcache - restore node_modules from a remote cache
///
/// Fingerprints the dependencies declared in package.json, restores a
/// matching archive from the object store, or installs and uploads one
/// when none exists.
#[derive(Parser, Debug)]
#[command(name = "modcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    pub directory: Option<PathBuf>,

    /// Bucket to look up cached modules in
    #[arg(short, long, env = "MODCACHE_BUCKET")]
    pub bucket: Option<String>,

    /// Bucket to upload new archives to (defaults to --bucket)
    #[arg(long, env = "MODCACHE_UPLOAD_BUCKET")]
    pub upload_bucket: Option<String>,

    /// Object key prefix [default: node_modules]
    #[arg(long = "path", value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// AWS region override
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint URL
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Use a local directory as the object store instead of S3
    #[arg(long, value_name = "DIR")]
    pub local_store: Option<PathBuf>,

    /// Print the cache key and exit without fetching or installing
    #[arg(long)]
    pub print_key: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "MODCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .modcache.toml discovery
    #[arg(long)]
    pub no_local: bool,
}

impl Cli {
    /// Command-line values as the top configuration layer
    pub fn overrides(&self) -> Config {
        let mut config = Config::default();
        config.store.bucket = self.bucket.clone();
        config.store.upload_bucket = self.upload_bucket.clone();
        config.store.prefix = self.prefix.clone();
        config.store.region = self.region.clone();
        config.store.endpoint_url = self.endpoint_url.clone();
        config.store.local_root = self.local_store.clone();
        config
    }
}
