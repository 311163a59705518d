//! Source Store
//!
//! Latest known content of every tracked file, plus a lazily computed
//! cache of its parsed code units. Any content write invalidates the
//! cache immediately; the cache is only read while valid.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::entities::ParsedFile;
use crate::domain::services::parse_file;
use crate::error::{ReloadError, ReloadResult};


#[derive(Debug, Default)]
struct SourceState {
    content: String,
    /// `Some` only while valid
    parsed: Option<Arc<ParsedFile>>,
}

/// Content and parse cache, keyed by absolute path
#[derive(Debug, Default)]
pub struct SourceStore {
    files: HashMap<PathBuf, SourceState>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content of `path` without diffing. Creates the entry if
    /// needed and always invalidates the cache.
    pub fn load(&mut self, path: &Path, content: String) {
        self.files.insert(
            path.to_path_buf(),
            SourceState {
                content,
                parsed: None,
            },
        );
    }

    /// Replace the content of `path` if it differs. Returns whether it did.
    pub fn update(&mut self, path: &Path, content: String) -> bool {
        match self.files.get_mut(path) {
            Some(state) if state.content == content => false,
            Some(state) => {
                state.content = content;
                state.parsed = None;
                true
            }
            None => {
                self.load(path, content);
                true
            }
        }
    }

    /// Parsed units of `path`, computed on first access after invalidation.
    ///
    /// A parse failure is returned and not cached.
    pub fn units_of(&mut self, path: &Path) -> ReloadResult<Arc<ParsedFile>> {
        let state = self
            .files
            .get_mut(path)
            .ok_or_else(|| ReloadError::Untracked {
                path: path.to_path_buf(),
            })?;

        if let Some(parsed) = &state.parsed {
            return Ok(Arc::clone(parsed));
        }

        let parsed = parse_file(&state.content).map_err(|e| ReloadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::trace!(path = %path.display(), units = parsed.units.len(), "parsed");
        let parsed = Arc::new(parsed);
        state.parsed = Some(Arc::clone(&parsed));
        Ok(parsed)
    }

    pub fn content_of(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(|s| s.content.as_str())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether the cached units of `path` are currently valid
    pub fn is_cached(&self, path: &Path) -> bool {
        self.files
            .get(path)
            .map(|s| s.parsed.is_some())
            .unwrap_or(false)
    }
}
