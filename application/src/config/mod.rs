//! Application-level configuration.
//!
//! - [`EngineConfig`]: per-session quota and render parallelism

pub mod engine_config;

pub use engine_config::EngineConfig;
