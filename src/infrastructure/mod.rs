//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `compiler` - `rustc` process driver
//! - `loader` - dynamic library loader feeding the patch table
//! - `manifest/` - build manifest reader and recorder
//! - `project` - project root discovery and source enumeration

pub mod compiler;
pub mod loader;
pub mod manifest;
pub mod project;

// Re-export for convenience
pub use compiler::ProcessCompiler;
pub use loader::DylibLoader;
pub use manifest::{BuildManifest, CommandRecord, ManifestCommandSource, ManifestRecorder};
pub use project::{discover_layout, enumerate_sources, find_project_root, purge_patch_root};
