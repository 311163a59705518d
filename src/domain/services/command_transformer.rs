//! Build Command Transformer Domain Service
//!
//! Rewrites the recorded `rustc` invocation of the host crate into one that
//! compiles a synthesized patch into a uniquely named `cdylib` linked
//! against the host crate's rlib.

use std::collections::BTreeSet;
use std::path::Path;

use crate::domain::value_objects::{BuildCommand, Generation};

/// Flags removed together with their single argument
const REMOVED_FLAGS: &[&str] = &[
    "--crate-name",
    "--crate-type",
    "--emit",
    "-o",
    "--out-dir",
    "--error-format",
    "--json",
    "--cap-lints",
];

/// Standalone flags removed on their own
const REMOVED_SWITCHES: &[&str] = &["--test"];

/// Codegen options removed (`-C name=..`)
const REMOVED_CODEGEN: &[&str] = &["incremental", "metadata", "extra-filename"];

/// Inputs of one transformation
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    pub patch_source: &'a Path,
    pub artifact: &'a Path,
    pub crate_name: &'a str,
    pub generation: Generation,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTransformer;

impl CommandTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Derive the patch compile from the host compile. Pure: equal inputs
    /// always give equal token sequences.
    pub fn transform(&self, original: &BuildCommand, request: &TransformRequest<'_>) -> BuildCommand {
        let host_library = host_rlib(original, request.crate_name);
        let sources: BTreeSet<String> = original
            .source_inputs()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut command = original.clone();
        for flag in REMOVED_FLAGS {
            command.remove_all(flag, 2);
        }
        for switch in REMOVED_SWITCHES {
            command.remove_all(switch, 1);
        }
        for name in REMOVED_CODEGEN {
            command.remove_codegen(name);
        }
        command.remove_where(|token| sources.contains(token));

        command.append([
            "--crate-name".to_string(),
            request.generation.patch_name(request.crate_name),
            "--crate-type".to_string(),
            "cdylib".to_string(),
            request.patch_source.to_string_lossy().into_owned(),
            "-o".to_string(),
            request.artifact.to_string_lossy().into_owned(),
        ]);
        if let Some((out_dir, rlib)) = host_library {
            command.append([
                "--extern".to_string(),
                format!("{}={}", request.crate_name, rlib),
                "-L".to_string(),
                format!("dependency={}", out_dir),
            ]);
        }
        command.append(["--cap-lints", "allow", "-C", "prefer-dynamic=no"]);
        command
    }
}

/// `(out_dir, {out_dir}/lib{crate}{extra_filename}.rlib)` when the host
/// invocation builds a library into a known directory
fn host_rlib(command: &BuildCommand, crate_name: &str) -> Option<(String, String)> {
    if !matches!(command.find_value("--crate-type"), None | Some("lib") | Some("rlib")) {
        return None;
    }
    let out_dir = command.find_value("--out-dir")?.trim_end_matches('/').to_string();
    let extra = command.find_codegen("extra-filename").unwrap_or_default();
    let rlib = format!("{}/lib{}{}.rlib", out_dir, crate_name, extra);
    Some((out_dir, rlib))
}
