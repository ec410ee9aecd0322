//! Page rendering configuration from TOML (`[render]` section)

use serde::{Deserialize, Serialize};

/// Raw render configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRenderConfig {
    /// Pages rendered concurrently by `render`
    pub workers: usize,
}

impl Default for FileRenderConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}
