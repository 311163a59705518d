//! Configuration module for hot-reload
//!
//! Configuration hierarchy:
//! 1. Builder / CLI overrides (highest priority)
//! 2. Environment variables (HOT_RELOAD_*)
//! 3. Project config (`.hot-reload.toml` in the project root)
//! 4. User config (`~/.config/hot-reload/config.toml`)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{ConfigWarning, PROJECT_CONFIG_FILE};
pub use types::{BuildConfig, Config, OutputConfig, Verbosity, WatchConfig};
