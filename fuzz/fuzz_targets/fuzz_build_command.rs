#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

use hot_reload::domain::services::TransformRequest;
use hot_reload::domain::value_objects::{BuildCommand, Generation};
use hot_reload::CommandTransformer;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let command = BuildCommand::new(content.split_whitespace().map(str::to_string).collect());
        let transformed = CommandTransformer::new().transform(
            &command,
            &TransformRequest {
                patch_source: Path::new("/p/lib.patch_0.rs"),
                artifact: Path::new("/p/lib.patch_0.so"),
                crate_name: "app",
                generation: Generation::new(0),
            },
        );
        assert!(transformed.source_inputs().contains(&"/p/lib.patch_0.rs"));
    }
});
