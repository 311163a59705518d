use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use hot_reload::domain::value_objects::BuildCommand;
use hot_reload::infrastructure::manifest::record_compile;

/// Detect `RUSTC_WRAPPER=hot-reload`: cargo runs the wrapper with the path
/// of the real compiler as the first argument.
pub fn wrapper_invocation(argv: &[String]) -> Option<(PathBuf, Vec<String>)> {
    let first = argv.get(1)?;
    let stem = Path::new(first).file_stem()?.to_str()?;
    if stem != "rustc" {
        return None;
    }
    Some((PathBuf::from(first), argv[2..].to_vec()))
}

/// Run the real compiler with inherited stdio, then record the command.
/// Returns the compiler's exit code.
pub fn cmd_wrap(rustc: &Path, args: &[String]) -> Result<i32> {
    let status = Command::new(rustc)
        .args(args)
        .status()
        .with_context(|| format!("failed to run {}", rustc.display()))?;

    if status.success() {
        let mut tokens = Vec::with_capacity(args.len() + 1);
        tokens.push(rustc.to_string_lossy().into_owned());
        tokens.extend(args.iter().cloned());
        let command = BuildCommand::new(tokens);

        let cwd = std::env::current_dir()?;
        match record_compile(&command, &cwd) {
            Ok(Some(manifest)) => tracing::debug!(manifest = %manifest.display(), "recorded"),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to record compile command"),
        }
    }
    Ok(status.code().unwrap_or(1))
}
