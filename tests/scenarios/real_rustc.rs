//! Scenario: a patch is built by the real `rustc` and mapped into this
//! process.
//!
//! A small host library is compiled to an rlib, then an edit is run through
//! the synthesizer, the command transformer, `ProcessCompiler` and
//! `DylibLoader`. The overrides are read back from the process-wide patch
//! table and called.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use hot_reload::domain::ports::{ArtifactLoader, Compiler};
use hot_reload::domain::services::{PatchRequest, TransformRequest};
use hot_reload::domain::value_objects::{BuildCommand, Generation};
use hot_reload::infrastructure::{DylibLoader, ProcessCompiler};
use hot_reload::{parse_file, patch_table, CommandTransformer, HotFn, PatchSynthesizer, StructuralDiffer};
use tempfile::TempDir;

const GREET_V1: &str = r#"
pub fn greeting() -> &'static str {
    "A"
}

#[repr(C)]
pub struct Counter {
    pub count: u32,
}

impl Counter {
    pub fn get(&self) -> u32 {
        self.count
    }
}
"#;

/// Same layout as the host's `Counter`
#[repr(C)]
#[allow(dead_code)]
struct Counter {
    count: u32,
}

fn rustc() -> String {
    std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string())
}

fn rustc_available() -> bool {
    Command::new(rustc())
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// A host library compiled once into `{dir}/out`
struct HostCrate {
    dir: TempDir,
    name: String,
    command: BuildCommand,
}

impl HostCrate {
    fn build(tag: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let name = format!("hot_host_{}_{}", tag, std::process::id());
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("out")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "pub mod greet;\n").unwrap();
        fs::write(dir.path().join("src/greet.rs"), GREET_V1).unwrap();

        let command = BuildCommand::new(vec![
            rustc(),
            "--crate-name".to_string(),
            name.clone(),
            "--edition=2021".to_string(),
            dir.path().join("src/lib.rs").to_string_lossy().into_owned(),
            "--crate-type".to_string(),
            "lib".to_string(),
            "--out-dir".to_string(),
            dir.path().join("out").to_string_lossy().into_owned(),
        ]);
        ProcessCompiler::new().compile(&command).unwrap();
        assert!(dir.path().join(format!("out/lib{}.rlib", name)).exists());

        Self { dir, name, command }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Synthesize, compile and load the edit of `greet.rs` to `new_source`.
    /// Returns the number of installed overrides.
    fn apply(&self, new_source: &str, generation: Generation) -> usize {
        let old = parse_file(GREET_V1).unwrap();
        let new = parse_file(new_source).unwrap();
        let diff = StructuralDiffer::new().diff(&old.units, &new.units);
        let module_path = vec!["greet".to_string()];

        let patch = PatchSynthesizer::new()
            .synthesize(&PatchRequest {
                diff: &diff,
                old: &old,
                new: &new,
                crate_name: &self.name,
                module_path: &module_path,
                generation,
            })
            .unwrap();

        let patch_source = self.path(&format!("{}.rs", generation.patch_name(&self.name)));
        fs::write(&patch_source, &patch.source).unwrap();
        let artifact = self.artifact_path(generation);

        let command = CommandTransformer::new().transform(
            &self.command,
            &TransformRequest {
                patch_source: &patch_source,
                artifact: &artifact,
                crate_name: &self.name,
                generation,
            },
        );
        ProcessCompiler::new().compile(&command).unwrap();
        assert!(artifact.exists(), "{} was not produced", artifact.display());

        DylibLoader::new().load(&artifact, generation).unwrap()
    }

    fn artifact_path(&self, generation: Generation) -> PathBuf {
        let file = format!(
            "{}{}{}",
            std::env::consts::DLL_PREFIX,
            generation.patch_name(&self.name),
            std::env::consts::DLL_SUFFIX
        );
        self.path("out").join(file)
    }
}

#[test]
fn scenario_real_patch_redirects_free_function() {
    if !rustc_available() {
        eprintln!("rustc not found, skipping");
        return;
    }
    let host = HostCrate::build("fn");

    let installed = host.apply(&GREET_V1.replace("\"A\"", "\"B\""), Generation::new(0));
    assert_eq!(installed, 1);

    let key = format!("{}::greet::greeting", host.name);
    let address = patch_table().lookup(&key).unwrap();
    let greeting: fn() -> &'static str = unsafe { std::mem::transmute::<usize, fn() -> &'static str>(address) };
    assert_eq!(greeting(), "B");

    fn original() -> &'static str {
        "A"
    }
    let module: &'static str = Box::leak(format!("{}::greet", host.name).into_boxed_str());
    let call_site = HotFn::new(module, "greeting");
    assert_eq!(call_site.get(original as fn() -> &'static str)(), "B");
}

#[test]
fn scenario_real_patch_redirects_inherent_method() {
    if !rustc_available() {
        eprintln!("rustc not found, skipping");
        return;
    }
    let host = HostCrate::build("method");

    let edited = GREET_V1.replace("        self.count\n", "        self.count * 10\n");
    assert_ne!(edited, GREET_V1);
    let installed = host.apply(&edited, Generation::new(1));
    assert_eq!(installed, 1);

    let key = format!("{}::greet::Counter::get", host.name);
    let address = patch_table().lookup(&key).unwrap();
    let get: fn(&Counter) -> u32 = unsafe { std::mem::transmute::<usize, fn(&Counter) -> u32>(address) };
    assert_eq!(get(&Counter { count: 4 }), 40);
}
