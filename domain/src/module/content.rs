//! Module source text and its content identity.

use super::identifier::ModuleIdentifier;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Token that changes iff a module's source changed.
///
/// Derived from the SHA-256 digest of the source, or taken from a
/// storage revision id when the resolver has one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContentIdentity(String);

impl ContentIdentity {
    pub fn from_source(source: &str) -> Self {
        let digest = Sha256::digest(source.as_bytes());
        Self(format!("sha256:{:x}", digest))
    }

    pub fn from_revision(revision: u64) -> Self {
        Self(format!("rev:{}", revision))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable module source produced by a resolver.
#[derive(Debug, Clone)]
pub struct ContentBlob {
    identifier: ModuleIdentifier,
    source: Arc<str>,
    identity: ContentIdentity,
}

impl ContentBlob {
    /// Wrap source text, deriving the identity from its digest.
    pub fn new(identifier: ModuleIdentifier, source: impl Into<Arc<str>>) -> Self {
        let source = source.into();
        let identity = ContentIdentity::from_source(&source);
        Self {
            identifier,
            source,
            identity,
        }
    }

    /// Wrap source text under an identity supplied by storage.
    pub fn with_identity(
        identifier: ModuleIdentifier,
        source: impl Into<Arc<str>>,
        identity: ContentIdentity,
    ) -> Self {
        Self {
            identifier,
            source: source.into(),
            identity,
        }
    }

    pub fn identifier(&self) -> &ModuleIdentifier {
        &self.identifier
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn identity(&self) -> &ContentIdentity {
        &self.identity
    }
}
