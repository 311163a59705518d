//! Recording fakes for the compiler and loader ports.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hot_reload::domain::ports::{ArtifactLoader, Compiler};
use hot_reload::domain::value_objects::{BuildCommand, Generation};
use hot_reload::{ReloadError, ReloadResult};

/// Records every command and writes an empty artifact at its `-o` path
#[derive(Clone, Default)]
pub struct FakeCompiler {
    pub commands: Arc<Mutex<Vec<BuildCommand>>>,
    pub fail: bool,
}

impl FakeCompiler {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn recorded(&self) -> Vec<BuildCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl Compiler for FakeCompiler {
    fn compile(&self, command: &BuildCommand) -> ReloadResult<()> {
        self.commands.lock().unwrap().push(command.clone());
        if self.fail {
            return Err(ReloadError::Compile {
                message: "error[E0425]: cannot find value `x` in this scope".to_string(),
            });
        }
        if let Some(output) = command.find_value("-o") {
            fs::write(output, b"").map_err(|e| ReloadError::Compile {
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Records every load; reports one override per load
#[derive(Clone, Default)]
pub struct FakeLoader {
    pub loads: Arc<Mutex<Vec<(PathBuf, Generation)>>>,
}

impl FakeLoader {
    pub fn recorded(&self) -> Vec<(PathBuf, Generation)> {
        self.loads.lock().unwrap().clone()
    }
}

impl ArtifactLoader for FakeLoader {
    fn load(&self, artifact: &Path, generation: Generation) -> ReloadResult<usize> {
        if !artifact.exists() {
            return Err(ReloadError::Load {
                path: artifact.to_path_buf(),
                message: "no such file".to_string(),
            });
        }
        self.loads.lock().unwrap().push((artifact.to_path_buf(), generation));
        Ok(1)
    }
}
