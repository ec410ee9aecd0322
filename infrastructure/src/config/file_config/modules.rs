//! Module source location from TOML (`[modules]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw module source configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModulesConfig {
    /// Directory holding one `.lua` file per module
    pub directory: PathBuf,
}

impl Default for FileModulesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("modules"),
        }
    }
}
