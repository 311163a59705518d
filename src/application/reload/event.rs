//! Reload event types

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::value_objects::Generation;
use crate::error::ReloadError;

/// Debounce duration in milliseconds
pub const DEBOUNCE_MS: u64 = 100;

/// Pipeline stage a cycle failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Reading,
    Diffing,
    Synthesizing,
    Transforming,
    Compiling,
    Loading,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Reading => "reading",
            Stage::Diffing => "diffing",
            Stage::Synthesizing => "synthesizing",
            Stage::Transforming => "transforming",
            Stage::Compiling => "compiling",
            Stage::Loading => "loading",
        };
        f.write_str(name)
    }
}

/// Successful end of one per-file cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The file was unknown; its content is now the baseline
    Tracked,
    /// Nothing diffable changed
    NoChanges,
    /// A patch was compiled and handed to the loader
    Loaded {
        generation: Generation,
        overrides: usize,
        artifact: PathBuf,
    },
}

/// Failed cycle: the stage it stopped in and why
#[derive(Debug)]
pub struct CycleFailure {
    pub stage: Stage,
    pub error: ReloadError,
}

impl CycleFailure {
    pub fn new(stage: Stage, error: ReloadError) -> Self {
        Self { stage, error }
    }
}

impl fmt::Display for CycleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for CycleFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReloadEvent {
    /// Startup scan finished and the watcher is registered
    WatchStarted { root: String, files: usize },
    /// The detector reported a file
    FileChanged { path: String },
    /// A file appeared after startup and became a baseline
    FileTracked { path: String },
    /// No diffable unit changed
    NoChanges { path: String },
    /// Patch source written
    PatchGenerated {
        path: String,
        generation: Generation,
        patch: String,
        changes: String,
        overrides: usize,
    },
    /// Compiler started
    Compiling { path: String, generation: Generation },
    /// Artifact loaded and overrides installed
    PatchLoaded {
        path: String,
        generation: Generation,
        artifact: String,
        overrides: usize,
    },
    /// A cycle failed; watching continues
    Failed {
        path: String,
        stage: Stage,
        kind: String,
        message: String,
    },
    /// Watch stopped
    Shutdown,
}

impl ReloadEvent {
    pub(crate) fn failed(path: &Path, failure: &CycleFailure) -> Self {
        ReloadEvent::Failed {
            path: display(path),
            stage: failure.stage,
            kind: failure.error.kind().to_string(),
            message: failure.error.to_string(),
        }
    }

    /// Convert to JSON string with "command": "watch" and a UTC timestamp
    pub fn to_json(&self) -> String {
        let mut value =
            serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"event": "error"}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("command".to_string(), serde_json::json!("watch"));
            obj.insert(
                "timestamp".to_string(),
                serde_json::json!(chrono::Utc::now().to_rfc3339()),
            );
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ReloadEvent::Failed { .. })
    }
}

pub(crate) fn display(path: &Path) -> String {
    path.display().to_string()
}
