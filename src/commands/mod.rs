pub mod diff;
pub mod synthesize;
pub mod units;
pub mod watch;
pub mod wrap;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use hot_reload::ParsedFile;

/// Read and parse a Rust source file for the inspection commands
pub(crate) fn read_units(path: &Path) -> Result<ParsedFile> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    hot_reload::parse_file(&content).with_context(|| format!("failed to parse {}", path.display()))
}
