#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(parsed) = hot_reload::parse_file(content) {
            // A file always diffs empty against itself
            let diff = hot_reload::StructuralDiffer::new().diff(&parsed.units, &parsed.units);
            assert!(diff.is_empty());
        }
    }
});
