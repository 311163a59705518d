//! Compiler port - runs one build command to completion
//!
//! The core never parses diagnostics; success is the exit status.

use crate::domain::value_objects::BuildCommand;
use crate::error::ReloadResult;

/// Abstract compiler invocation
///
/// Implementations:
/// - `ProcessCompiler` - spawns token 0 of the command as a subprocess
/// - test fakes that record commands instead of running them
pub trait Compiler: Send {
    /// Run `command`, blocking until it exits.
    ///
    /// Returns `ReloadError::Compile` when the process cannot be spawned,
    /// exits non-zero, or exceeds its time budget.
    fn compile(&self, command: &BuildCommand) -> ReloadResult<()>;
}
