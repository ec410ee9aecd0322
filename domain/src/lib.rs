//! Domain layer for wikiscript
//!
//! This crate contains the core types of the module execution engine.
//! It has no dependencies on the Lua runtime or on any host concerns.
//!
//! # Core Concepts
//!
//! ## Module
//!
//! A named unit of user-authored script code living in the `Module`
//! namespace. A module is identified by a [`ModuleIdentifier`] and its
//! source text travels as a [`ContentBlob`] stamped with a
//! [`ContentIdentity`] that changes iff the text changes.
//!
//! ## Session
//!
//! One host page render. A session owns a [`ResourceQuota`] that is consumed
//! cumulatively by every invocation within it.
//!
//! ## Invocation
//!
//! A single call into a loaded module's exported function. It either yields
//! a display string or an [`InvocationError`].

pub mod config;
pub mod core;
pub mod module;
pub mod quota;
pub mod scripting;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::error::{ErrorKind, InvocationError};
pub use module::{
    content::{ContentBlob, ContentIdentity},
    identifier::{IdentifierError, MODULE_NAMESPACE, ModuleIdentifier, is_module_title},
    loaded::{FunctionHandle, LoadedModule},
};
pub use quota::{LimitKind, LimitReport, QuotaUsage, ResourceQuota};
pub use scripting::{ScriptValue, join_display};
pub use validation::{Diagnostic, ValidationReport};
