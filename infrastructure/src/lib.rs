//! Infrastructure layer for wikiscript
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod resolver;
#[cfg(feature = "scripting")]
pub mod scripting;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ENV_PREFIX, FileConfig, FileLimitsConfig, FileModulesConfig, FileRenderConfig,
};
pub use resolver::{DirectorySourceResolver, InMemorySourceResolver};
#[cfg(feature = "scripting")]
pub use scripting::{LuaSandbox, LuaScriptEngine};
