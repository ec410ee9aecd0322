//! Source resolver port.
//!
//! Maps a module identifier to its source text. The page-storage subsystem
//! behind it belongs to the host; infrastructure adapters provide in-memory
//! and directory-backed implementations.

use thiserror::Error;
use wikiscript_domain::{ContentBlob, ModuleIdentifier};

/// Errors that can occur while resolving module source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No module exists under this identifier.
    #[error("module not found: {0}")]
    NotFound(ModuleIdentifier),

    /// The backing store could not be read.
    #[error("module source unavailable for {module}: {reason}")]
    Unavailable {
        module: ModuleIdentifier,
        reason: String,
    },
}

/// Port for looking up module source.
///
/// Implementations must be side-effect free and safe to call repeatedly.
/// The returned [`ContentBlob`]'s identity must change if and only if the
/// underlying content changed.
pub trait SourceResolverPort: Send + Sync {
    fn resolve(&self, identifier: &ModuleIdentifier) -> Result<ContentBlob, ResolveError>;

    /// Whether a module exists, without materializing it.
    fn exists(&self, identifier: &ModuleIdentifier) -> bool {
        self.resolve(identifier).is_ok()
    }
}
