//! Configuration file loading for wikiscript
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `WIKISCRIPT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./wikiscript.toml` or `./.wikiscript.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/wikiscript/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileLimitsConfig, FileModulesConfig, FileRenderConfig};
pub use loader::{ConfigLoader, ENV_PREFIX};
