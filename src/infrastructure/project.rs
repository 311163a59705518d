//! Project Discovery
//!
//! Locates the Cargo project around an entry file, prepares the patch
//! output directory and enumerates the watched sources.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::BuildConfig;
use crate::domain::value_objects::ProjectLayout;
use crate::error::{ReloadError, ReloadResult};
use crate::infrastructure::manifest::resolve_build_root;

/// File whose directory is the project root
pub const PROJECT_MARKER: &str = "Cargo.toml";

/// Nearest ancestor of `start` (inclusive) containing `Cargo.toml`
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let start = if start.is_file() { start.parent()? } else { start };
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_MARKER).is_file())
        .map(Path::to_path_buf)
}

/// Resolve the layout for `entry` using the `[build]` settings.
///
/// The build root honours `HOT_RELOAD_BUILD_ROOT` like the recorder does.
pub fn discover_layout(entry: &Path, build: &BuildConfig) -> ReloadResult<ProjectLayout> {
    let entry = fs::canonicalize(entry).map_err(|_| ReloadError::ProjectNotFound {
        entry: entry.to_path_buf(),
    })?;
    let project_root = find_project_root(&entry).ok_or_else(|| ReloadError::ProjectNotFound {
        entry: entry.clone(),
    })?;
    let build_root = resolve_build_root(&project_root, build);
    Ok(ProjectLayout::new(
        entry,
        project_root,
        &build_root.to_string_lossy(),
        &build.patch_dir,
    ))
}

/// Remove everything under the patch root and recreate it empty
pub fn purge_patch_root(layout: &ProjectLayout) -> ReloadResult<()> {
    if layout.patch_root.exists() {
        fs::remove_dir_all(&layout.patch_root)?;
    }
    fs::create_dir_all(&layout.patch_root)?;
    tracing::debug!(patch_root = %layout.patch_root.display(), "patch root purged");
    Ok(())
}

/// Whether `path` ends in one of `extensions`
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|w| w == ext))
        .unwrap_or(false)
}

/// Every file under `root` with a watched extension.
///
/// Hidden entries and anything under `excluded` are skipped. Ignore files
/// are honoured even outside a git repository.
pub fn enumerate_sources(root: &Path, extensions: &[String], excluded: &Path) -> Vec<PathBuf> {
    let excluded = excluded.to_path_buf();
    let walker = WalkBuilder::new(root)
        .standard_filters(true)
        .hidden(true)
        .require_git(false)
        .filter_entry(move |entry| !entry.path().starts_with(&excluded))
        .build();

    let mut files: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extensions))
        .collect();
    files.sort();
    files
}
