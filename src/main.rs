//! hot-reload CLI
//!
//! Usage: hot-reload <COMMAND>
//!
//! Commands:
//!   units       List the code units of a source file
//!   diff        Structural diff between two versions of a file
//!   synthesize  Print the patch crate for an edit
//!   watch       Watch a project and compile patches continuously
//!   wrap        Record compile commands (also `RUSTC_WRAPPER=hot-reload`)

mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::synthesize::SynthesizeArgs;

/// Environment variable holding a `tracing` filter, e.g. `hot_reload=debug`
const LOG_ENV: &str = "HOT_RELOAD_LOG";

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("hot_reload={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args_os()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    if let Some((rustc, args)) = commands::wrap::wrapper_invocation(&argv) {
        init_tracing(0);
        let code = commands::wrap::cmd_wrap(&rustc, &args)?;
        std::process::exit(code);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Units { file } => commands::units::cmd_units(&file, cli.json),
        Commands::Diff { old, new } => commands::diff::cmd_diff(&old, &new, cli.json),
        Commands::Synthesize {
            old,
            new,
            crate_name,
            module,
            generation,
            output,
        } => commands::synthesize::cmd_synthesize(
            &SynthesizeArgs {
                old: &old,
                new: &new,
                crate_name: &crate_name,
                module: &module,
                generation,
                output: output.as_deref(),
            },
            cli.json,
        ),
        Commands::Watch { entry } => commands::watch::cmd_watch(&entry, cli.json),
        Commands::Wrap { rustc, args } => {
            let code = commands::wrap::cmd_wrap(&rustc, &args)?;
            std::process::exit(code);
        }
    }
}
