use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use hot_reload::domain::services::PatchRequest;
use hot_reload::domain::value_objects::Generation;
use hot_reload::{PatchSynthesizer, StructuralDiffer};

pub struct SynthesizeArgs<'a> {
    pub old: &'a Path,
    pub new: &'a Path,
    pub crate_name: &'a str,
    pub module: &'a str,
    pub generation: u64,
    pub output: Option<&'a Path>,
}

/// `net::client` → `["net", "client"]`; empty for the crate root
pub fn parse_module_path(module: &str) -> Vec<String> {
    module
        .split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn cmd_synthesize(args: &SynthesizeArgs<'_>, json: bool) -> Result<()> {
    let old = super::read_units(args.old)?;
    let new = super::read_units(args.new)?;
    let diff = StructuralDiffer::new().diff(&old.units, &new.units);
    let module_path = parse_module_path(args.module);

    let patch = PatchSynthesizer::new().synthesize(&PatchRequest {
        diff: &diff,
        old: &old,
        new: &new,
        crate_name: args.crate_name,
        module_path: &module_path,
        generation: Generation::new(args.generation),
    })?;

    if let Some(output) = args.output {
        fs::write(output, &patch.source).with_context(|| format!("failed to write {}", output.display()))?;
    }

    if json {
        let overrides: Vec<_> = patch
            .overrides
            .iter()
            .map(|o| serde_json::json!({ "key": o.key, "replacement": o.replacement }))
            .collect();
        crate::ui::json::emit(serde_json::json!({
            "event": "synthesized",
            "command": "synthesize",
            "generation": patch.generation,
            "changes": diff.summary(),
            "overrides": overrides,
            "added": patch.added,
            "source": args.output.is_none().then_some(&patch.source),
        }))?;
    } else if args.output.is_none() {
        println!("{}", patch.source);
    } else {
        eprintln!(
            "{} overrides, {} added units ({})",
            patch.overrides.len(),
            patch.added.len(),
            diff.summary()
        );
    }
    Ok(())
}
