//! Process Compiler
//!
//! Implements the Compiler port by spawning the build command as a
//! subprocess. Diagnostics go to the inherited stderr and are never parsed.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::domain::ports::Compiler;
use crate::domain::value_objects::BuildCommand;
use crate::error::{ReloadError, ReloadResult};

/// How often a timed compile checks whether the child exited
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Spawns token 0 of a build command with the rest as arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCompiler {
    timeout: Option<Duration>,
}

impl ProcessCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the compiler and fail when it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Compiler for ProcessCompiler {
    fn compile(&self, command: &BuildCommand) -> ReloadResult<()> {
        let (program, args) = command.args().split_first().ok_or_else(|| ReloadError::Compile {
            message: "empty build command".to_string(),
        })?;

        tracing::debug!(program = %program, args = args.len(), "spawning compiler");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ReloadError::Compile {
                message: format!("cannot spawn {}: {}", program, e),
            })?;

        let status = match self.timeout {
            Some(limit) => wait_with_timeout(&mut child, limit)?,
            None => child.wait().map_err(|e| ReloadError::Compile {
                message: format!("cannot wait for {}: {}", program, e),
            })?,
        };

        if status.success() {
            Ok(())
        } else {
            Err(ReloadError::Compile {
                message: format!("{} failed with exit code: {:?}", program, status.code()),
            })
        }
    }
}

fn wait_with_timeout(child: &mut Child, limit: Duration) -> ReloadResult<ExitStatus> {
    let deadline = Instant::now() + limit;
    loop {
        let polled = child.try_wait().map_err(|e| ReloadError::Compile {
            message: format!("cannot wait for compiler: {}", e),
        })?;
        if let Some(status) = polled {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ReloadError::Compile {
                message: format!("timed out after {:.1}s", limit.as_secs_f64()),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
