//! hot-reload - live source patching for running Rust programs
//!
//! A watcher notices an edited `.rs` file, the changed functions are
//! diffed out of it, re-emitted as a small patch crate, compiled into a
//! `cdylib` and loaded into the running process. Calls routed through
//! [`hot!`] pick up the new code on their next invocation.
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     let _reloader = hot_reload::reloader!()?;
//!     loop {
//!         println!("{}", hot_reload::hot!(app::greet::greeting as fn() -> String)());
//!         std::thread::sleep(std::time::Duration::from_secs(1));
//!     }
//! }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runtime;

// Re-exports for convenience
pub use application::{ReloadEvent, ReloadHandle, Reloader, SourceStore};
pub use config::Config;
pub use domain::entities::{CodeUnit, ParsedFile};
pub use domain::services::{
    parse_file, CommandTransformer, DiffResult, PatchSynthesizer, StructuralDiffer,
};
pub use error::{ReloadError, ReloadResult};
pub use runtime::{patch_table, HotFn, PatchTable};

/// Start a [`Reloader`] for the calling crate's entry file
/// (`src/main.rs` or `src/lib.rs` under `CARGO_MANIFEST_DIR`).
///
/// Evaluates to `ReloadResult<ReloadHandle>`.
#[macro_export]
macro_rules! reloader {
    () => {{
        let manifest_dir = ::std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        let main = manifest_dir.join("src/main.rs");
        let entry = if main.is_file() { main } else { manifest_dir.join("src/lib.rs") };
        $crate::Reloader::new(entry).start()
    }};
    ($entry:expr) => {
        $crate::Reloader::new($entry).start()
    };
}
