//! Domain error types

use crate::quota::LimitKind;
use serde::Serialize;
use thiserror::Error;

/// Classification of an invocation failure.
///
/// `ResourceExceeded` is kept apart from everything else: it means the
/// sandbox stopped the module, not that the module failed on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "limit")]
pub enum ErrorKind {
    /// The resolver has no source for the identifier.
    ///
    /// The dispatcher reports a missing module as `NoSuchModule`, so this
    /// kind only appears when a host builds errors from resolver results
    /// itself.
    NotFound,
    /// The module source could not be compiled or did not evaluate to an export table.
    LoadError,
    /// The identifier is invalid or does not resolve.
    NoSuchModule,
    /// The module does not export the requested function.
    NoSuchFunction,
    /// The host supplied fewer positional slots than required.
    MissingArguments,
    /// A session quota was exhausted.
    ResourceExceeded(LimitKind),
    /// Uncaught failure while the module function ran.
    RuntimeFault,
}

impl ErrorKind {
    /// Host message key for this kind of failure.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::NotFound | Self::NoSuchModule => "scripting-common-nosuchmodule",
            Self::NoSuchFunction => "scripting-common-nosuchfunction",
            Self::MissingArguments => "scripting-common-nofunction",
            Self::LoadError => "scripting-common-loaderror",
            Self::ResourceExceeded(_) => "scripting-common-limitexceeded",
            Self::RuntimeFault => "scripting-common-error",
        }
    }
}

/// A failed invocation, carrying enough context to be rendered inline.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Script error: {message}")]
pub struct InvocationError {
    pub kind: ErrorKind,
    pub message: String,
    pub module: Option<String>,
    pub function: Option<String>,
}

impl InvocationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            module: None,
            function: None,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    // ==================== Constructors ====================

    pub fn missing_arguments() -> Self {
        Self::new(
            ErrorKind::MissingArguments,
            "You must specify a function to call.",
        )
    }

    pub fn no_such_module(module: impl Into<String>) -> Self {
        let module = module.into();
        Self::new(
            ErrorKind::NoSuchModule,
            format!("No such module \"{}\".", module),
        )
        .with_module(module)
    }

    pub fn no_such_function(module: impl Into<String>, function: impl Into<String>) -> Self {
        let function = function.into();
        Self::new(
            ErrorKind::NoSuchFunction,
            format!("The function \"{}\" does not exist.", function),
        )
        .with_module(module)
        .with_function(function)
    }

    pub fn resource_exceeded(limit: LimitKind) -> Self {
        Self::new(ErrorKind::ResourceExceeded(limit), limit.description())
    }

    // ==================== Queries ====================

    /// Whether the sandbox intervened (as opposed to the module failing).
    pub fn is_resource_exceeded(&self) -> bool {
        matches!(self.kind, ErrorKind::ResourceExceeded(_))
    }
}
