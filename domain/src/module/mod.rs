//! Module subdomain.
//!
//! - [`identifier::ModuleIdentifier`]: normalized, namespace-qualified module title
//! - [`content::ContentBlob`]: source text stamped with its [`content::ContentIdentity`]
//! - [`loaded::LoadedModule`]: the export table produced by a sandbox load

pub mod content;
pub mod identifier;
pub mod loaded;
