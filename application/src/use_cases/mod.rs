//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod invoke_module;
pub mod render_page;
pub mod report_limits;
pub mod validate_module;
