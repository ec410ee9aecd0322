//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters and the
//! embedding host must implement.

pub mod argument_expander;
pub mod scripting_engine;
pub mod source_resolver;
