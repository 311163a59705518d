//! Scenario: a developer edits functions in a running program.

use std::fs;
use std::sync::{Arc, Mutex};

use hot_reload::application::{CycleOutcome, ReloadSession};
use hot_reload::domain::value_objects::Generation;
use hot_reload::{Config, ReloadEvent, Reloader};

use crate::common::*;

struct Harness {
    project: TestProject,
    compiler: FakeCompiler,
    loader: FakeLoader,
    events: Arc<Mutex<Vec<String>>>,
    reloads: Arc<Mutex<usize>>,
    session: ReloadSession,
}

fn harness() -> Harness {
    let project = TestProject::new();
    project.record_manifest(&["src/lib.rs", "src/greet.rs"]);

    let compiler = FakeCompiler::default();
    let loader = FakeLoader::default();
    let events = Arc::new(Mutex::new(Vec::new()));
    let reloads = Arc::new(Mutex::new(0));

    let sink = Arc::clone(&events);
    let counter = Arc::clone(&reloads);
    let session = Reloader::new(project.path("src/lib.rs"))
        .with_config(Config::default())
        .with_compiler(compiler.clone())
        .with_loader(loader.clone())
        .on_event(move |event: &ReloadEvent| {
            let json: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();
            sink.lock().unwrap().push(json["event"].as_str().unwrap().to_string());
        })
        .on_reload(move || *counter.lock().unwrap() += 1)
        .prepare()
        .unwrap();

    Harness {
        project,
        compiler,
        loader,
        events,
        reloads,
        session,
    }
}

#[test]
fn scenario_changed_function_is_compiled_and_loaded() {
    let mut h = harness();
    let greet = h
        .project
        .write("src/greet.rs", "pub fn greeting() -> &'static str { \"B\" }\n");

    let outcomes = h.session.handle_batch(&[greet]);

    let CycleOutcome::Loaded {
        generation,
        overrides,
        artifact,
    } = &outcomes[0]
    else {
        panic!("expected a loaded patch, got {:?}", outcomes);
    };
    assert_eq!(*generation, Generation::new(0));
    assert_eq!(*overrides, 1);
    assert!(artifact.starts_with(h.project.path(".build/patches")));

    let compiled = h.compiler.recorded();
    assert_eq!(compiled.len(), 1);
    assert_eq!(compiled[0].find_value("--crate-name"), Some("app_patch_0"));
    assert_eq!(compiled[0].find_value("--crate-type"), Some("cdylib"));

    let patch = fs::read_to_string(h.project.path(".build/patches/greet.patch_0.rs")).unwrap();
    assert!(patch.contains("greeting_patch_0"));
    assert!(patch.contains("\"app::greet::greeting\""));

    assert_eq!(h.loader.recorded().len(), 1);
    assert_eq!(*h.reloads.lock().unwrap(), 1);
    assert_eq!(
        *h.events.lock().unwrap(),
        vec!["file_changed", "patch_generated", "compiling", "patch_loaded"]
    );
}

#[test]
fn scenario_whitespace_edit_compiles_nothing() {
    let mut h = harness();
    let greet = h.project.write(
        "src/greet.rs",
        "pub fn greeting()   ->   &'static str {\n    \"A\"\n}\n",
    );

    let outcomes = h.session.handle_batch(&[greet]);

    assert!(matches!(outcomes[0], CycleOutcome::NoChanges));
    assert!(h.compiler.recorded().is_empty());
    assert_eq!(*h.reloads.lock().unwrap(), 0);
}

#[test]
fn scenario_successive_edits_use_fresh_generations() {
    let mut h = harness();
    let greet = h.project.path("src/greet.rs");

    h.project
        .write("src/greet.rs", "pub fn greeting() -> &'static str { \"B\" }\n");
    h.session.handle_batch(std::slice::from_ref(&greet));
    h.project
        .write("src/greet.rs", "pub fn greeting() -> &'static str { \"C\" }\n");
    h.session.handle_batch(std::slice::from_ref(&greet));

    let generations: Vec<u64> = h.loader.recorded().iter().map(|(_, g)| g.value()).collect();
    assert_eq!(generations, vec![0, 1]);
    let names: Vec<String> = h
        .compiler
        .recorded()
        .iter()
        .map(|c| c.find_value("--crate-name").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["app_patch_0", "app_patch_1"]);
    assert_eq!(h.session.state().counter.peek(), Generation::new(2));
}

#[test]
fn scenario_added_helper_ships_without_override() {
    let mut h = harness();
    let greet = h.project.write(
        "src/greet.rs",
        "pub fn greeting() -> &'static str { \"A\" }\npub fn farewell() -> &'static str { \"bye\" }\n",
    );

    let outcomes = h.session.handle_batch(&[greet]);

    assert!(matches!(outcomes[0], CycleOutcome::Loaded { .. }));
    let patch = fs::read_to_string(h.project.path(".build/patches/greet.patch_0.rs")).unwrap();
    assert!(patch.contains("fn farewell"));
    assert!(!patch.contains("farewell_patch_0"));
}

#[test]
fn scenario_new_file_becomes_baseline() {
    let mut h = harness();
    let extra = h.project.write("src/extra.rs", "pub fn extra() -> u8 { 1 }\n");

    let outcomes = h.session.handle_batch(&[extra]);

    assert!(matches!(outcomes[0], CycleOutcome::Tracked));
    assert!(h.compiler.recorded().is_empty());
    assert_eq!(*h.events.lock().unwrap(), vec!["file_changed", "file_tracked"]);
}
