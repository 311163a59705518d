//! Dynamic Loader
//!
//! Implements the ArtifactLoader port with `libloading`. A loaded patch is
//! asked for its overrides through its exported entry point; they are
//! installed into the patch table in one step. Libraries are kept resident
//! for the rest of the process lifetime.

use std::ffi::c_void;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use libloading::{Library, Symbol};

use crate::domain::ports::ArtifactLoader;
use crate::domain::value_objects::Generation;
use crate::error::{ReloadError, ReloadResult};
use crate::runtime::{collect_override, patch_table, EntryFn, PatchTable};

/// Serializes loads process-wide
static LOAD_LOCK: Mutex<()> = Mutex::new(());

/// Every library ever loaded; never unloaded
static RESIDENT: Mutex<Vec<Library>> = Mutex::new(Vec::new());

/// Loads patch libraries into the current process
#[derive(Debug, Clone, Copy)]
pub struct DylibLoader {
    table: &'static PatchTable,
}

impl DylibLoader {
    pub fn new() -> Self {
        Self {
            table: patch_table(),
        }
    }

    /// Number of patch libraries mapped into the process
    pub fn resident_count() -> usize {
        RESIDENT.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for DylibLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactLoader for DylibLoader {
    fn load(&self, artifact: &Path, generation: Generation) -> ReloadResult<usize> {
        let _guard = LOAD_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let library = unsafe { Library::new(artifact) }.map_err(|e| load_error(artifact, e))?;
        let symbol = generation.entry_symbol();

        let mut overrides: Vec<(String, usize)> = Vec::new();
        {
            let entry: Symbol<EntryFn> =
                unsafe { library.get(symbol.as_bytes()) }.map_err(|e| load_error(artifact, e))?;
            // SAFETY: the entry point was generated with the `EntryFn`
            // signature and only calls `collect_override` with `ctx`.
            unsafe {
                entry(
                    &mut overrides as *mut Vec<(String, usize)> as *mut c_void,
                    collect_override,
                )
            };
        }

        let installed = self.table.install(overrides);
        tracing::debug!(artifact = %artifact.display(), generation = %generation, installed, "patch loaded");

        RESIDENT
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(library);
        Ok(installed)
    }
}

fn load_error(artifact: &Path, error: libloading::Error) -> ReloadError {
    ReloadError::Load {
        path: artifact.to_path_buf(),
        message: error.to_string(),
    }
}
