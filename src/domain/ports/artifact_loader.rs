//! ArtifactLoader port - maps a compiled patch into the running process

use std::path::Path;

use crate::domain::value_objects::Generation;
use crate::error::ReloadResult;

/// Abstract dynamic loader
///
/// Implementations:
/// - `DylibLoader` - `libloading` plus the in-process patch table
/// - test fakes
pub trait ArtifactLoader: Send {
    /// Load `artifact`, run the entry point of `generation` and install
    /// every override it registers. Returns the number of overrides.
    ///
    /// A loaded artifact is never unloaded. On failure nothing already
    /// installed changes.
    fn load(&self, artifact: &Path, generation: Generation) -> ReloadResult<usize>;
}
