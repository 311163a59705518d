//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod artifact_loader;
pub mod command_source;
pub mod compiler;

pub use artifact_loader::ArtifactLoader;
pub use command_source::CommandSource;
pub use compiler::Compiler;
