//! Build Manifest
//!
//! The YAML manifest of recorded compile commands: its model, the
//! CommandSource implementation reading it, and the recorder behind
//! `hot-reload wrap`.

mod model;
mod recorder;
mod source;

pub use model::{BuildManifest, CommandRecord};
pub use recorder::{record_compile, recordable, resolve_build_root, ManifestRecorder, RecordableCompile, BUILD_ROOT_ENV};
pub use source::ManifestCommandSource;
