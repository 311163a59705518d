//! Configuration type definitions

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::reload::DEBOUNCE_MS;
use crate::error::ReloadResult;

use super::loader::{self, ConfigWarning};

/// Watch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// File extensions that are watched and parsed
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Quiet period after a filesystem event before the tree is polled
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Timer-driven poll interval, for filesystems that drop events
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            debounce_ms: default_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_extensions() -> Vec<String> {
    vec!["rs".to_string()]
}

fn default_debounce_ms() -> u64 {
    DEBOUNCE_MS
}

fn default_poll_interval_ms() -> u64 {
    1000
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Build root, relative to the project root
    #[serde(default = "default_build_dir")]
    pub dir: String,

    /// Build manifest file name inside the build root
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Patch output directory inside the build root
    #[serde(default = "default_patch_dir")]
    pub patch_dir: String,

    /// Tool identifier of manifest commands that are external-process invocations
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Kill the compiler after this many seconds (0 = wait forever)
    #[serde(default)]
    pub compile_timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dir: default_build_dir(),
            manifest: default_manifest(),
            patch_dir: default_patch_dir(),
            tool: default_tool(),
            compile_timeout_secs: 0,
        }
    }
}

impl BuildConfig {
    pub fn compile_timeout(&self) -> Option<Duration> {
        (self.compile_timeout_secs > 0).then(|| Duration::from_secs(self.compile_timeout_secs))
    }
}

fn default_build_dir() -> String {
    ".build".to_string()
}

fn default_manifest() -> String {
    "debug.yaml".to_string()
}

fn default_patch_dir() -> String {
    "patches".to_string()
}

fn default_tool() -> String {
    "shell".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub verbosity: Verbosity,

    /// Emit NDJSON events instead of human-readable lines
    #[serde(default)]
    pub json: bool,
}

/// Verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> ReloadResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> ReloadResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from project config, user config, or defaults
    pub fn load_or_default(project_root: Option<&Path>) -> Self {
        loader::load_or_default(project_root)
    }

    /// Apply environment variable overrides (HOT_RELOAD_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Whether a path carries one of the watched extensions
    pub fn is_watched(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.watch.extensions.iter().any(|w| w == ext))
            .unwrap_or(false)
    }
}
