//! modcache - dependency cache accelerator
//!
//! Restores a project's `node_modules` from an object store keyed by a
//! fingerprint of its declared dependencies, and publishes a fresh
//! archive when the cache misses.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod store;
pub mod tools;
pub mod ui;

pub use error::{ModcacheError, ModcacheResult, Stage, StageError};
