//! Error types for hot-reload
//!
//! Every per-file failure of a reload cycle is a variant of [`ReloadError`].
//! None of them is fatal to the watch loop: the orchestrator reports the
//! failure and keeps watching.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hot-reload operations
pub type ReloadResult<T> = Result<T, ReloadError>;

/// Main error type for hot-reload operations
#[derive(Error, Debug)]
pub enum ReloadError {
    /// File content unreadable at detection time
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid Rust
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The source store never saw this path
    #[error("file is not tracked: {path}")]
    Untracked { path: PathBuf },

    /// Build manifest missing or malformed
    #[error("build manifest unavailable at {path}: {message}")]
    ManifestUnavailable { path: PathBuf, message: String },

    /// No build-manifest command lists the file as an input
    #[error("no build command found for {path}")]
    CommandNotFound { path: PathBuf },

    /// The located command has no `--crate-name` flag
    #[error("build command for {path} has no crate name")]
    ModuleNameMissing { path: PathBuf },

    /// A changed or added unit cannot be re-emitted standalone
    #[error("cannot synthesize patch for '{unit}': {reason}")]
    Synthesis { unit: String, reason: String },

    /// The compiler could not be spawned, exited non-zero, or timed out
    #[error("compilation failed: {message}")]
    Compile { message: String },

    /// The OS loader rejected the artifact
    #[error("failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// No `Cargo.toml` above the entry point
    #[error("no Cargo.toml found above {entry}")]
    ProjectNotFound { entry: PathBuf },

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// File watcher could not be registered
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReloadError {
    /// Short machine-readable kind, used in NDJSON events
    pub fn kind(&self) -> &'static str {
        match self {
            ReloadError::Read { .. } => "read_error",
            ReloadError::Parse { .. } => "parse_failure",
            ReloadError::Untracked { .. } => "untracked",
            ReloadError::ManifestUnavailable { .. } => "manifest_unavailable",
            ReloadError::CommandNotFound { .. } => "command_not_found",
            ReloadError::ModuleNameMissing { .. } => "module_name_missing",
            ReloadError::Synthesis { .. } => "synthesis_failure",
            ReloadError::Compile { .. } => "compile_failure",
            ReloadError::Load { .. } => "load_failure",
            ReloadError::ProjectNotFound { .. } => "project_not_found",
            ReloadError::Config { .. } => "config_error",
            ReloadError::Watch(_) => "watch_error",
            ReloadError::Io(_) => "io_error",
        }
    }
}
