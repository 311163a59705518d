use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// hot-reload - live source patching for running Rust programs
#[derive(Parser, Debug)]
#[command(name = "hot-reload")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the code units of a Rust source file
    Units {
        /// Source file
        file: PathBuf,
    },

    /// Structural diff between two versions of a source file
    Diff {
        /// Previous version
        old: PathBuf,
        /// Edited version
        new: PathBuf,
    },

    /// Synthesize the patch crate for an edit, without compiling it
    Synthesize {
        /// Previous version
        old: PathBuf,
        /// Edited version
        new: PathBuf,

        /// Crate name of the host crate
        #[arg(long)]
        crate_name: String,

        /// Module path of the file inside the crate (e.g. `net::client`)
        #[arg(long, default_value = "")]
        module: String,

        /// Patch generation
        #[arg(long, default_value_t = 0)]
        generation: u64,

        /// Write the patch here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Watch a project and compile a patch for every edit (patches are
    /// checked, not loaded into this process)
    Watch {
        /// Entry source file of the watched crate
        #[arg(short, long, default_value = "src/main.rs")]
        entry: PathBuf,
    },

    /// Run rustc and record the compile command into the build manifest.
    /// `RUSTC_WRAPPER=hot-reload` reaches the same code without this word.
    Wrap {
        /// The real compiler
        rustc: PathBuf,

        /// Compiler arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}
