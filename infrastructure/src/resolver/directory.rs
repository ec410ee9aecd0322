//! Directory-backed source resolver
//!
//! This module provides the [`DirectorySourceResolver`] implementation of
//! [`SourceResolverPort`] that reads module source from `.lua` files.
//!
//! # File Layout
//!
//! Each module maps to one file under the root directory. Spaces in the
//! title become underscores and `/` separates subpages into directories:
//!
//! | Module                  | File                        |
//! |-------------------------|-----------------------------|
//! | `Module:Greeter`        | `<root>/Greeter.lua`        |
//! | `Module:Data tables`    | `<root>/Data_tables.lua`    |
//! | `Module:Greeter/config` | `<root>/Greeter/config.lua` |
//!
//! # Example
//!
//! ```ignore
//! use wikiscript_infrastructure::DirectorySourceResolver;
//! use wikiscript_application::SourceResolverPort;
//! use wikiscript_domain::ModuleIdentifier;
//!
//! let resolver = DirectorySourceResolver::new("modules");
//! let blob = resolver.resolve(&ModuleIdentifier::parse("Greeter")?)?;
//! println!("{} ({})", blob.identifier(), blob.identity());
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use wikiscript_application::{ResolveError, SourceResolverPort};
use wikiscript_domain::{ContentBlob, ModuleIdentifier};

/// File extension of module source files.
pub const MODULE_EXTENSION: &str = "lua";

/// Source resolver that reads from the local file system.
///
/// The file is read on every resolve, so edits made while a session runs
/// are picked up by the next invocation (and trigger a reload through the
/// content identity).
///
/// # Thread Safety
///
/// `DirectorySourceResolver` holds no mutable state and is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct DirectorySourceResolver {
    root: PathBuf,
}

impl DirectorySourceResolver {
    /// Creates a resolver rooted at `root`.
    ///
    /// The directory is not required to exist yet; every lookup against a
    /// missing root is simply `NotFound`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a module, or `None` if the title cannot be mapped to
    /// a path inside the root.
    ///
    /// Rejects titles with empty, `.` or `..` path segments and titles
    /// containing a backslash, so no title can name a file outside the root.
    pub fn path_for(&self, identifier: &ModuleIdentifier) -> Option<PathBuf> {
        let name = identifier.name().replace(' ', "_");
        if name.contains('\\') {
            return None;
        }

        let segments: Vec<&str> = name.split('/').collect();
        if segments
            .iter()
            .any(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return None;
        }

        let mut path = self.root.clone();
        let (file, dirs) = segments.split_last()?;
        for dir in dirs {
            path.push(dir);
        }
        path.push(format!("{}.{}", file, MODULE_EXTENSION));
        Some(path)
    }
}

impl SourceResolverPort for DirectorySourceResolver {
    fn resolve(&self, identifier: &ModuleIdentifier) -> Result<ContentBlob, ResolveError> {
        let Some(path) = self.path_for(identifier) else {
            debug!(module = %identifier, "Title does not map to a module file");
            return Err(ResolveError::NotFound(identifier.clone()));
        };

        match fs::read_to_string(&path) {
            Ok(source) => {
                debug!(module = %identifier, path = %path.display(), "Read module source");
                Ok(ContentBlob::new(identifier.clone(), source))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ResolveError::NotFound(identifier.clone()))
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to read module source: {}", e);
                Err(ResolveError::Unavailable {
                    module: identifier.clone(),
                    reason: format!("{}: {}", path.display(), e),
                })
            }
        }
    }

    fn exists(&self, identifier: &ModuleIdentifier) -> bool {
        self.path_for(identifier).is_some_and(|p| p.is_file())
    }
}
