//! Scripting engine port: interface for the module sandbox.
//!
//! This port abstracts the scripting runtime so that:
//! - The application/presentation layers don't depend on mlua
//! - A no-op implementation (`NoScriptEngine`) is always available
//! - The `scripting` feature gate only affects infrastructure + CLI
//!
//! There are two levels:
//! - [`ScriptEnginePort`] is shared by all sessions. It creates sandboxes
//!   and performs editor-time validation.
//! - [`SandboxPort`] is one isolated interpreter owned by one render session.

use thiserror::Error;
use wikiscript_domain::{
    ContentBlob, Diagnostic, LimitKind, LoadedModule, QuotaUsage, ResourceQuota, ScriptValue,
    ValidationReport,
};

/// Error from a sandbox operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    /// The source could not be compiled or did not produce an export table.
    #[error("{0}")]
    Load(String),

    /// The function raised an error while running.
    #[error("{0}")]
    Runtime(String),

    /// The handle does not belong to this sandbox's export set.
    #[error("function \"{0}\" is not exported")]
    NoSuchFunction(String),

    /// A quota tripped. Sticky for the rest of the session.
    #[error("{0} limit exceeded")]
    ResourceExceeded(LimitKind),

    /// The interpreter could not be created.
    #[error("sandbox setup failed: {0}")]
    Setup(String),
}

/// Port for the engine shared by all sessions.
///
/// The infrastructure layer provides the real `LuaScriptEngine`; when the
/// `scripting` feature is disabled, `NoScriptEngine` is used instead.
pub trait ScriptEnginePort: Send + Sync {
    /// Engine name shown in limit reports (e.g. "Lua 5.4").
    fn name(&self) -> &str;

    /// Language tag for module pages, used by editors for highlighting.
    fn code_language(&self) -> &str {
        "lua"
    }

    /// Create an isolated sandbox bound to the given quota.
    fn new_sandbox(&self, quota: &ResourceQuota) -> Result<Box<dyn SandboxPort>, SandboxError>;

    /// Check source syntax without executing it.
    ///
    /// Diagnostics come back in source order.
    fn validate(&self, source: &str, display_name: &str) -> ValidationReport;

    /// Whether the engine is actually available (i.e. not `NoScriptEngine`).
    fn is_available(&self) -> bool;
}

/// One isolated interpreter, exclusively owned by a render session.
pub trait SandboxPort: Send {
    /// Compile and evaluate a module, returning its export table.
    fn load(&mut self, blob: &ContentBlob) -> Result<LoadedModule, SandboxError>;

    /// Call an exported function with already-expanded arguments.
    fn invoke(
        &mut self,
        module: &LoadedModule,
        function: &str,
        args: &[ScriptValue],
    ) -> Result<Vec<ScriptValue>, SandboxError>;

    /// Quota consumed so far.
    fn usage(&self) -> QuotaUsage;
}

/// No-op engine used when the `scripting` feature is disabled.
///
/// Sandboxes cannot be created, so every invocation degrades to an inline
/// error instead of failing the render. Validation reports the missing
/// engine rather than passing the source unchecked.
pub struct NoScriptEngine;

impl ScriptEnginePort for NoScriptEngine {
    fn name(&self) -> &str {
        "none"
    }

    fn new_sandbox(&self, _quota: &ResourceQuota) -> Result<Box<dyn SandboxPort>, SandboxError> {
        Err(SandboxError::Setup(
            "no scripting engine is available in this build".to_string(),
        ))
    }

    fn validate(&self, _source: &str, _display_name: &str) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.push(Diagnostic::new(
            "no scripting engine is available in this build",
        ));
        report
    }

    fn is_available(&self) -> bool {
        false
    }
}
