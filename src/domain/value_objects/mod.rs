//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod build_command;
mod generation;
mod layout;
mod scope;

pub use build_command::{is_source_input, BuildCommand};
pub use generation::{Generation, GenerationCounter, ENTRY_SYMBOL_PREFIX};
pub use layout::{module_path, ProjectLayout};
pub use scope::{ScopeKind, ScopePath, ScopeSegment};
