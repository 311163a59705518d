//! Manifest recorder
//!
//! Used by `hot-reload wrap`, which cargo runs as `RUSTC_WRAPPER`. Every
//! library compile of a project crate is recorded into the manifest so the
//! reloader can later rebuild a patch against it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{BuildManifest, CommandRecord};
use crate::config::{BuildConfig, Config};
use crate::domain::value_objects::{is_source_input, BuildCommand};
use crate::error::{ReloadError, ReloadResult};
use crate::infrastructure::project::{enumerate_sources, find_project_root};

/// Environment variable overriding the build root used for recording
pub const BUILD_ROOT_ENV: &str = "HOT_RELOAD_BUILD_ROOT";

/// Build root of `project_root`: `$HOT_RELOAD_BUILD_ROOT` when set,
/// otherwise `{project_root}/{build.dir}`
pub fn resolve_build_root(project_root: &Path, build: &BuildConfig) -> PathBuf {
    std::env::var_os(BUILD_ROOT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| project_root.join(&build.dir))
}

/// Writes command records into one manifest file under an exclusive lock
#[derive(Debug, Clone)]
pub struct ManifestRecorder {
    path: PathBuf,
}

impl ManifestRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Insert or replace the record for `output`
    pub fn record(&self, output: &str, record: CommandRecord) -> ReloadResult<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let lock_file = fs::File::create(self.lock_path())?;
        lock_file.lock_exclusive()?;

        let result = self.record_locked(parent, output, record);

        let _ = lock_file.unlock();
        result
    }

    fn record_locked(&self, parent: &Path, output: &str, record: CommandRecord) -> ReloadResult<()> {
        let mut manifest = match fs::read_to_string(&self.path) {
            Ok(text) => BuildManifest::parse(&text).unwrap_or_else(|e| {
                tracing::warn!(manifest = %self.path.display(), error = %e, "discarding malformed build manifest");
                BuildManifest::default()
            }),
            Err(_) => BuildManifest::default(),
        };
        manifest.record(output, record);

        let yaml = manifest.to_yaml().map_err(|e| ReloadError::ManifestUnavailable {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(yaml.as_bytes())?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// A compile worth recording: a library build that emits an rlib
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordableCompile {
    pub crate_name: String,
    /// Absolute path of the crate root file
    pub crate_root: PathBuf,
    /// `{out_dir}/lib{crate}{extra}.rlib`
    pub output: String,
}

/// Decide whether a `rustc` invocation (token 0 is the compiler) should be
/// recorded. `cwd` resolves a relative crate root.
pub fn recordable(command: &BuildCommand, cwd: &Path) -> Option<RecordableCompile> {
    if command.args().iter().any(|a| a == "--test") {
        return None;
    }
    if !matches!(command.find_value("--crate-type"), Some("lib") | Some("rlib")) {
        return None;
    }
    if let Some(emit) = command.find_value("--emit") {
        if !emit.split(',').any(|kind| kind == "link" || kind.starts_with("link=")) {
            return None;
        }
    }
    let crate_name = command.find_value("--crate-name")?.to_string();
    let root = *command.source_inputs().first()?;
    let crate_root = cwd.join(root);
    let out_dir = command.find_value("--out-dir")?.trim_end_matches('/');
    let extra = command.find_codegen("extra-filename").unwrap_or_default();
    Some(RecordableCompile {
        output: format!("{}/lib{}{}.rlib", out_dir, crate_name, extra),
        crate_name,
        crate_root,
    })
}

/// Record `command` into the manifest of the project around its crate
/// root. Returns the manifest path, or `None` when the compile is not
/// recorded (dependency crates, tests, metadata-only builds).
pub fn record_compile(command: &BuildCommand, cwd: &Path) -> ReloadResult<Option<PathBuf>> {
    let Some(compile) = recordable(command, cwd) else {
        return Ok(None);
    };
    let crate_root = fs::canonicalize(&compile.crate_root)?;
    let Some(project_root) = find_project_root(&crate_root) else {
        return Ok(None);
    };

    let config = Config::load_or_default(Some(&project_root));
    let build_root = resolve_build_root(&project_root, &config.build);
    let manifest_path = build_root.join(&config.build.manifest);

    let source_dir = crate_root.parent().unwrap_or(&project_root);
    let inputs: Vec<String> = enumerate_sources(source_dir, &["rs".to_string()], &build_root)
        .into_iter()
        .filter(|path| !belongs_to_other_target(path, &crate_root, &project_root))
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    let root_token = compile.crate_root.to_string_lossy().into_owned();
    let absolute_root = crate_root.to_string_lossy().into_owned();
    let args: Vec<String> = command
        .args()
        .iter()
        .map(|arg| {
            if *arg == root_token || (is_source_input(arg) && cwd.join(arg) == compile.crate_root) {
                absolute_root.clone()
            } else {
                arg.clone()
            }
        })
        .collect();

    let record = CommandRecord {
        tool: config.build.tool.clone(),
        inputs,
        outputs: vec![compile.output.clone()],
        description: Some(format!("Compiling {}", compile.crate_name)),
        args: Some(args),
        deps: None,
    };
    ManifestRecorder::new(&manifest_path).record(&compile.output, record)?;
    tracing::debug!(crate_name = %compile.crate_name, manifest = %manifest_path.display(), "compile recorded");
    Ok(Some(manifest_path))
}

/// Sources beside the crate root that cargo compiles as separate targets:
/// the other crate root file (`main.rs` next to `lib.rs` and vice versa),
/// `bin/` binaries, the build script, and the `tests`, `benches` and
/// `examples` trees
fn belongs_to_other_target(path: &Path, crate_root: &Path, project_root: &Path) -> bool {
    if path == crate_root {
        return false;
    }
    let source_dir = crate_root.parent().unwrap_or(project_root);
    if path.parent() == Some(source_dir)
        && matches!(path.file_name().and_then(|n| n.to_str()), Some("main.rs" | "lib.rs"))
    {
        return true;
    }
    if path == project_root.join("build.rs") {
        return true;
    }
    let other_trees = [
        source_dir.join("bin"),
        project_root.join("tests"),
        project_root.join("benches"),
        project_root.join("examples"),
    ];
    other_trees.iter().any(|tree| path.starts_with(tree))
}
