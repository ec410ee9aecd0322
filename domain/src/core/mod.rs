//! Core domain concepts shared across all subdomains.
//!
//! - [`error::InvocationError`]: structured, display-safe invocation failures

pub mod error;
