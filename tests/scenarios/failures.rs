//! Scenario: edits that cannot be patched leave the session usable.

use std::sync::{Arc, Mutex};

use hot_reload::application::{CycleOutcome, ReloadSession};
use hot_reload::{Config, ReloadEvent, Reloader};

use crate::common::*;

fn session(project: &TestProject, compiler: FakeCompiler, failures: Arc<Mutex<Vec<(String, String)>>>) -> ReloadSession {
    Reloader::new(project.path("src/lib.rs"))
        .with_config(Config::default())
        .with_compiler(compiler)
        .with_loader(FakeLoader::default())
        .on_event(move |event: &ReloadEvent| {
            if let ReloadEvent::Failed { stage, kind, .. } = event {
                failures.lock().unwrap().push((stage.to_string(), kind.clone()));
            }
        })
        .prepare()
        .unwrap()
}

#[test]
fn scenario_file_missing_from_manifest_then_recovers() {
    let project = TestProject::new();
    project.record_manifest(&["src/lib.rs", "src/greet.rs"]);
    project.write("src/orphan.rs", "pub fn orphan() -> u8 { 1 }\n");
    let failures = Arc::new(Mutex::new(Vec::new()));
    let mut session = session(&project, FakeCompiler::default(), Arc::clone(&failures));

    let orphan = project.write("src/orphan.rs", "pub fn orphan() -> u8 { 2 }\n");
    let greet = project.write("src/greet.rs", "pub fn greeting() -> &'static str { \"B\" }\n");
    let outcomes = session.handle_batch(&[orphan, greet]);

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], CycleOutcome::Loaded { .. }));
    assert_eq!(
        *failures.lock().unwrap(),
        vec![("reading".to_string(), "command_not_found".to_string())]
    );
}

#[test]
fn scenario_missing_manifest_is_reported() {
    let project = TestProject::new();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let mut session = session(&project, FakeCompiler::default(), Arc::clone(&failures));

    let greet = project.write("src/greet.rs", "pub fn greeting() -> &'static str { \"B\" }\n");
    let outcomes = session.handle_batch(&[greet]);

    assert!(outcomes.is_empty());
    assert_eq!(failures.lock().unwrap()[0].1, "manifest_unavailable");
}

#[test]
fn scenario_broken_edit_keeps_last_good_baseline() {
    let project = TestProject::new();
    project.record_manifest(&["src/lib.rs", "src/greet.rs"]);
    let failures = Arc::new(Mutex::new(Vec::new()));
    let compiler = FakeCompiler::default();
    let mut session = session(&project, compiler.clone(), Arc::clone(&failures));
    let greet = project.path("src/greet.rs");

    project.write("src/greet.rs", "pub fn greeting() -> &'static str { \"B\" \n");
    let outcomes = session.handle_batch(std::slice::from_ref(&greet));
    assert!(outcomes.is_empty());
    assert_eq!(failures.lock().unwrap()[0].1, "parse_failure");

    project.write("src/greet.rs", "pub fn greeting() -> &'static str { \"B\" }\n");
    let outcomes = session.handle_batch(std::slice::from_ref(&greet));
    assert!(matches!(outcomes[0], CycleOutcome::Loaded { .. }));
    assert_eq!(compiler.recorded().len(), 1);
}

#[test]
fn scenario_compile_error_does_not_stop_the_session() {
    let project = TestProject::new();
    project.record_manifest(&["src/lib.rs", "src/greet.rs"]);
    let failures = Arc::new(Mutex::new(Vec::new()));
    let mut session = session(&project, FakeCompiler::failing(), Arc::clone(&failures));

    let greet = project.write("src/greet.rs", "pub fn greeting() -> &'static str { \"B\" }\n");
    session.handle_batch(std::slice::from_ref(&greet));
    project.write("src/greet.rs", "pub fn greeting() -> &'static str { \"C\" }\n");
    session.handle_batch(std::slice::from_ref(&greet));

    assert_eq!(
        *failures.lock().unwrap(),
        vec![
            ("compiling".to_string(), "compile_failure".to_string()),
            ("compiling".to_string(), "compile_failure".to_string()),
        ]
    );
}
