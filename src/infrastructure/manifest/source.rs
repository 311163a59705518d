//! Manifest-backed CommandSource
//!
//! The manifest is parsed on first use and re-read whenever its
//! modification time changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use super::BuildManifest;
use crate::domain::ports::CommandSource;
use crate::domain::value_objects::BuildCommand;
use crate::error::{ReloadError, ReloadResult};

struct Cached {
    modified: SystemTime,
    manifest: BuildManifest,
}

/// Looks up recorded commands in a YAML build manifest
pub struct ManifestCommandSource {
    path: PathBuf,
    tool: String,
    cache: Mutex<Option<Cached>>,
}

impl ManifestCommandSource {
    /// `tool` marks commands that are external-process invocations
    pub fn new(path: impl Into<PathBuf>, tool: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tool: tool.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, message: impl ToString) -> ReloadError {
        ReloadError::ManifestUnavailable {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    fn read(&self, modified: SystemTime) -> ReloadResult<Cached> {
        let text = fs::read_to_string(&self.path).map_err(|e| self.unavailable(e))?;
        let manifest = BuildManifest::parse(&text).map_err(|e| self.unavailable(e))?;
        tracing::debug!(
            manifest = %self.path.display(),
            commands = manifest.commands.len(),
            "build manifest loaded"
        );
        Ok(Cached { modified, manifest })
    }
}

impl CommandSource for ManifestCommandSource {
    fn find_command(&self, file: &Path) -> ReloadResult<BuildCommand> {
        let modified = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| self.unavailable(e))?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let cached = match cache.take() {
            Some(cached) if cached.modified == modified => cached,
            _ => self.read(modified)?,
        };

        let args = cached
            .manifest
            .find_command(&self.tool, file)
            .and_then(|record| record.args.clone());
        *cache = Some(cached);

        args.filter(|args| !args.is_empty())
            .map(BuildCommand::new)
            .ok_or_else(|| ReloadError::CommandNotFound {
                path: file.to_path_buf(),
            })
    }
}
