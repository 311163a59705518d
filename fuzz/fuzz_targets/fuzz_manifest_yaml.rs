#![no_main]

use libfuzzer_sys::fuzz_target;

use hot_reload::infrastructure::manifest::BuildManifest;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(manifest) = BuildManifest::parse(content) {
            let _ = manifest.find_command("shell", std::path::Path::new("/app/src/lib.rs"));
        }
    }
});
