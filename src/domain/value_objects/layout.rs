//! Project Layout Value Object
//!
//! Where the reloader reads sources from and writes patches to.

use std::path::{Component, Path, PathBuf};

use super::Generation;

/// Resolved directories of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// The file the reloader was started from
    pub entry_point: PathBuf,
    /// Directory containing the entry point; the watched tree
    pub source_root: PathBuf,
    /// Directory containing `Cargo.toml`
    pub project_root: PathBuf,
    /// Build root, `{project_root}/.build` by default
    pub build_root: PathBuf,
    /// Patch output root, cleared once at startup
    pub patch_root: PathBuf,
}

impl ProjectLayout {
    pub fn new(
        entry_point: PathBuf,
        project_root: PathBuf,
        build_dir: &str,
        patch_dir: &str,
    ) -> Self {
        let source_root = entry_point
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| project_root.clone());
        let build_root = project_root.join(build_dir);
        let patch_root = build_root.join(patch_dir);
        Self {
            entry_point,
            source_root,
            project_root,
            build_root,
            patch_root,
        }
    }

    /// `{patch_root}/{stem}.patch_{gen}.rs`
    pub fn patch_source_path(&self, file: &Path, generation: Generation) -> PathBuf {
        self.patch_root
            .join(format!("{}.patch_{}.rs", file_stem(file), generation))
    }

    /// `{patch_root}/{stem}.patch_{gen}.{dylib|so|dll}`
    pub fn artifact_path(&self, file: &Path, generation: Generation) -> PathBuf {
        self.patch_root.join(format!(
            "{}.patch_{}.{}",
            file_stem(file),
            generation,
            std::env::consts::DLL_EXTENSION
        ))
    }

    pub fn manifest_path(&self, manifest: &str) -> PathBuf {
        self.build_root.join(manifest)
    }
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "patch".to_string())
}

/// Module path of `file` inside the crate whose root file is `crate_root`.
///
/// `src/lib.rs` → `[]`, `src/net/client.rs` → `["net", "client"]`,
/// `src/net/mod.rs` → `["net"]`. Returns `None` when the file does not live
/// under the crate root's directory. `#[path]` attributes are not followed.
pub fn module_path(crate_root: &Path, file: &Path) -> Option<Vec<String>> {
    if crate_root == file {
        return Some(Vec::new());
    }
    let base = crate_root.parent()?;
    let relative = file.strip_prefix(base).ok()?;

    let mut segments: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
            _ => return None,
        }
    }

    let last = segments.pop()?;
    let stem = last.strip_suffix(".rs")?;
    if stem != "mod" {
        segments.push(stem.to_string());
    }
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ProjectLayout {
        ProjectLayout::new(
            PathBuf::from("/work/app/src/main.rs"),
            PathBuf::from("/work/app"),
            ".build",
            "patches",
        )
    }

    #[test]
    fn derives_directories() {
        let layout = layout();
        assert_eq!(layout.source_root, PathBuf::from("/work/app/src"));
        assert_eq!(layout.build_root, PathBuf::from("/work/app/.build"));
        assert_eq!(layout.patch_root, PathBuf::from("/work/app/.build/patches"));
        assert_eq!(
            layout.manifest_path("debug.yaml"),
            PathBuf::from("/work/app/.build/debug.yaml")
        );
    }

    #[test]
    fn patch_paths_are_unique_per_generation() {
        let layout = layout();
        let file = Path::new("/work/app/src/greeter.rs");

        let first = layout.patch_source_path(file, Generation::new(0));
        let second = layout.patch_source_path(file, Generation::new(1));
        assert_eq!(first, PathBuf::from("/work/app/.build/patches/greeter.patch_0.rs"));
        assert_ne!(first, second);
        assert_ne!(
            layout.artifact_path(file, Generation::new(0)),
            layout.artifact_path(file, Generation::new(1))
        );
    }

    #[test]
    fn module_path_of_nested_files() {
        let root = Path::new("/p/src/lib.rs");
        assert_eq!(module_path(root, root), Some(vec![]));
        assert_eq!(
            module_path(root, Path::new("/p/src/net/client.rs")),
            Some(vec!["net".to_string(), "client".to_string()])
        );
        assert_eq!(
            module_path(root, Path::new("/p/src/net/mod.rs")),
            Some(vec!["net".to_string()])
        );
        assert_eq!(module_path(root, Path::new("/elsewhere/x.rs")), None);
    }
}
