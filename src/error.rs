//! Error types for modcache
//!
//! Components return `ModcacheResult<T>`. The pipeline wraps fatal
//! failures in a [`StageError`] naming the stage that failed.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for modcache operations
pub type ModcacheResult<T> = Result<T, ModcacheError>;

/// All errors that can occur in modcache
#[derive(Error, Debug)]
pub enum ModcacheError {
    // Configuration errors
    #[error("missing required bucket")]
    MissingBucket,

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigValue(String),

    // Manifest errors
    #[error("failed to open package file {path:?}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode package file {path:?}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // Object store errors
    #[error("failed to get object {bucket}/{key}: {reason}")]
    ObjectGet {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("failed to put object {bucket}/{key}: {reason}")]
    ObjectPut {
        bucket: String,
        key: String,
        reason: String,
    },

    // External tool errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command exited unsuccessfully: {command}, exit code: {code}")]
    CommandStatus { command: String, code: i32 },

    #[error("Process terminated by signal: {command}")]
    ProcessSignaled { command: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ModcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Map a finished process status to an error, if it did not succeed
    pub fn from_status(command: impl Into<String>, status: std::process::ExitStatus) -> Option<Self> {
        if status.success() {
            return None;
        }
        let command = command.into();
        Some(match status.code() {
            Some(code) => Self::CommandStatus { command, code },
            None => Self::ProcessSignaled { command },
        })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingBucket => {
                Some("Pass --bucket, set MODCACHE_BUCKET, or set store.bucket in config")
            }
            Self::ManifestRead { .. } => Some("Run modcache from a directory containing package.json"),
            Self::ObjectPut { .. } => Some("Check AWS credentials and write access to the upload bucket"),
            _ => None,
        }
    }
}

/// Pipeline stage in which a fatal failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resolving configuration and the object store client
    Configure,
    /// Reading or parsing the manifest
    LoadManifest,
    /// Downloading or extracting a cached archive
    Fetch,
    /// Running the dependency installer
    Install,
    /// Creating the dependency archive
    Archive,
    /// Uploading the archive
    Upload,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configure => "configure modcache",
            Self::LoadManifest => "load manifest",
            Self::Fetch => "restore cached modules",
            Self::Install => "install modules",
            Self::Archive => "create module archive",
            Self::Upload => "upload module archive",
        };
        write!(f, "{}", name)
    }
}

/// A fatal error tagged with the stage it occurred in
#[derive(Error, Debug)]
#[error("failed to {stage}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: ModcacheError,
}

impl StageError {
    pub fn new(stage: Stage, source: ModcacheError) -> Self {
        Self { stage, source }
    }

    /// Get actionable hint for the underlying error
    pub fn hint(&self) -> Option<&'static str> {
        self.source.hint()
    }
}

/// Extension for tagging component results with their pipeline stage
pub trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T, StageError>;
}

impl<T> StageContext<T> for ModcacheResult<T> {
    fn stage(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|e| StageError::new(stage, e))
    }
}
