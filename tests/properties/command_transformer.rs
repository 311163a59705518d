//! Property tests for build command rewriting.

use std::path::PathBuf;

use proptest::prelude::*;

use hot_reload::domain::services::TransformRequest;
use hot_reload::domain::value_objects::{BuildCommand, Generation};
use hot_reload::CommandTransformer;

fn crate_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,10}").unwrap()
}

fn extra_flags() -> impl Strategy<Value = Vec<String>> {
    let flag = prop_oneof![
        Just(vec!["--edition=2021".to_string()]),
        Just(vec!["-C".to_string(), "debuginfo=2".to_string()]),
        Just(vec!["-C".to_string(), "incremental=/t/incremental".to_string()]),
        Just(vec!["--cfg".to_string(), "feature=\"std\"".to_string()]),
        Just(vec!["--error-format=json".to_string()]),
        Just(vec!["-L".to_string(), "dependency=/t/deps".to_string()]),
    ];
    proptest::collection::vec(flag, 0..6).prop_map(|groups| groups.concat())
}

fn host_command(name: &str, extra: &[String]) -> BuildCommand {
    let mut args = vec![
        "rustc".to_string(),
        "--crate-name".to_string(),
        name.to_string(),
        "src/lib.rs".to_string(),
        "--crate-type".to_string(),
        "lib".to_string(),
        "--out-dir".to_string(),
        "/t/deps".to_string(),
    ];
    args.extend(extra.iter().cloned());
    BuildCommand::new(args)
}

fn transform(command: &BuildCommand, name: &str, generation: u64) -> BuildCommand {
    let patch = PathBuf::from(format!("/p/.build/patches/lib.patch_{generation}.rs"));
    let artifact = PathBuf::from(format!("/p/.build/patches/lib.patch_{generation}.so"));
    CommandTransformer::new().transform(
        command,
        &TransformRequest {
            patch_source: &patch,
            artifact: &artifact,
            crate_name: name,
            generation: Generation::new(generation),
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Equal inputs always produce equal commands.
    #[test]
    fn property_transform_is_deterministic(
        name in crate_name(),
        extra in extra_flags(),
        generation in 0u64..1000
    ) {
        let command = host_command(&name, &extra);
        prop_assert_eq!(transform(&command, &name, generation), transform(&command, &name, generation));
    }

    /// PROPERTY: The patch is the only source input and the crate is renamed.
    #[test]
    fn property_patch_is_sole_input_with_unique_name(
        name in crate_name(),
        extra in extra_flags(),
        generation in 0u64..1000
    ) {
        let transformed = transform(&host_command(&name, &extra), &name, generation);
        let expected_source = format!("/p/.build/patches/lib.patch_{generation}.rs");
        prop_assert_eq!(transformed.source_inputs(), vec![expected_source.as_str()]);
        let expected_name = format!("{name}_patch_{generation}");
        prop_assert_eq!(transformed.find_value("--crate-name"), Some(expected_name.as_str()));
        prop_assert_eq!(transformed.find_value("--crate-type"), Some("cdylib"));
        prop_assert!(!transformed.args().iter().any(|a| a.starts_with("incremental=")));
    }
}
