//! CommandSource port - finds the recorded compile command of a file

use std::path::Path;

use crate::domain::value_objects::BuildCommand;
use crate::error::ReloadResult;

/// Where recorded build commands come from
///
/// Implementations:
/// - `ManifestCommandSource` - YAML build manifest under the build root
/// - test fakes holding commands in memory
pub trait CommandSource: Send {
    /// The command of the external-process tool whose inputs contain
    /// `file`.
    ///
    /// Fails with `CommandNotFound` when no command lists the file, and
    /// with `ManifestUnavailable` when the manifest cannot be read.
    fn find_command(&self, file: &Path) -> ReloadResult<BuildCommand>;
}
