//! Build manifest model
//!
//! ```yaml
//! commands:
//!   /app/target/debug/deps/libapp-1f2e.rlib:
//!     tool: shell
//!     inputs: [/app/src/lib.rs, /app/src/greet.rs]
//!     outputs: [/app/target/debug/deps/libapp-1f2e.rlib]
//!     description: Compiling app
//!     args: [rustc, --crate-name, app, ...]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Output artifact path to the command that produces it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub commands: BTreeMap<String, CommandRecord>,
}

/// One recorded build step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub tool: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps: Option<String>,
}

impl BuildManifest {
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml_ng::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }

    /// First command of `tool` whose inputs contain `file`
    pub fn find_command(&self, tool: &str, file: &Path) -> Option<&CommandRecord> {
        self.commands
            .values()
            .find(|record| record.tool == tool && record.inputs.iter().any(|i| Path::new(i) == file))
    }

    pub fn record(&mut self, output: impl Into<String>, record: CommandRecord) {
        self.commands.insert(output.into(), record);
    }
}
