//! Isolated project environment for hot-reload tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use hot_reload::infrastructure::manifest::{BuildManifest, CommandRecord};
use tempfile::TempDir;

/// Result of running the hot-reload CLI
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Run the CLI with `args` in `cwd`
pub fn run_cli(cwd: &Path, args: &[&str]) -> TestResult {
    let output = Command::new(env!("CARGO_BIN_EXE_hot-reload"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("HOT_RELOAD_LOG")
        .env_remove("HOT_RELOAD_BUILD_ROOT")
        .output()
        .expect("failed to run hot-reload binary");

    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

/// A Cargo project in a temp directory.
///
/// `src/lib.rs` is the crate root; `src/greet.rs` is a module of it.
pub struct TestProject {
    _dir: TempDir,
    root: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let project = Self { _dir: dir, root };
        project.write(
            "Cargo.toml",
            "[package]\nname = \"app\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
        );
        project.write("src/lib.rs", "pub mod greet;\n");
        project.write("src/greet.rs", "pub fn greeting() -> &'static str { \"A\" }\n");
        project
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `.build/debug.yaml` the way the compile wrapper would: one
    /// phony target plus the rustc command of the library, which lists
    /// `inputs` (relative to the project root)
    pub fn record_manifest(&self, inputs: &[&str]) -> PathBuf {
        let lib = self.path("src/lib.rs").display().to_string();
        let out_dir = self.path("target/debug/deps").display().to_string();
        let rlib = format!("{}/libapp-1f2e.rlib", out_dir);
        let inputs: Vec<String> = inputs.iter().map(|i| self.path(i).display().to_string()).collect();

        let mut manifest = BuildManifest::default();
        manifest.record(
            "<app>",
            CommandRecord {
                tool: "phony".to_string(),
                inputs: vec![lib.clone()],
                outputs: vec!["<app>".to_string()],
                ..CommandRecord::default()
            },
        );
        manifest.record(
            rlib.clone(),
            CommandRecord {
                tool: "shell".to_string(),
                inputs,
                outputs: vec![rlib],
                description: Some("Compiling app".to_string()),
                args: Some(
                    [
                        "rustc",
                        "--crate-name",
                        "app",
                        "--edition=2021",
                        &lib,
                        "--crate-type",
                        "lib",
                        "--emit=dep-info,metadata,link",
                        "-C",
                        "extra-filename=-1f2e",
                        "--out-dir",
                        &out_dir,
                    ]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                ),
                deps: None,
            },
        );
        self.write(".build/debug.yaml", &manifest.to_yaml().unwrap())
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
