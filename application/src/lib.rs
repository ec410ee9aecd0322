//! Application layer for wikiscript
//!
//! This crate contains use cases, port definitions, the session-scoped
//! module cache and application configuration.
//! It depends only on the domain layer.

pub mod cache;
pub mod config;
pub mod ports;
pub mod session;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use cache::{CacheEntry, CacheError, ModuleCache};
pub use config::EngineConfig;
pub use ports::{
    argument_expander::{ArgumentExpander, LiteralExpander},
    scripting_engine::{NoScriptEngine, SandboxError, SandboxPort, ScriptEnginePort},
    source_resolver::{ResolveError, SourceResolverPort},
};
pub use session::{RenderSession, SessionStats};
pub use use_cases::invoke_module::{InvokeModuleUseCase, MAIN_FUNCTION};
pub use use_cases::render_page::{InvocationRequest, PageRender, RenderPageUseCase};
pub use use_cases::report_limits::ReportLimitsUseCase;
pub use use_cases::validate_module::ValidateModuleUseCase;
