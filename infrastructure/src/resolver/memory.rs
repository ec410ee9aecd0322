use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use wikiscript_application::{ResolveError, SourceResolverPort};
use wikiscript_domain::{ContentBlob, ContentIdentity, IdentifierError, ModuleIdentifier};

/// Module source held in memory.
///
/// Storing a module again replaces it, and the next resolve returns the
/// new content under a new identity. Blobs already handed out keep their
/// own copy of the text.
#[derive(Debug, Default)]
pub struct InMemorySourceResolver {
    modules: RwLock<HashMap<ModuleIdentifier, ContentBlob>>,
}

impl InMemorySourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `source` under `title`; the identity is derived from the text.
    pub fn insert(&self, title: &str, source: &str) -> Result<ModuleIdentifier, IdentifierError> {
        let identifier = ModuleIdentifier::parse(title)?;
        self.store(ContentBlob::new(identifier.clone(), source));
        Ok(identifier)
    }

    /// Store `source` under a revision number supplied by the caller's storage.
    pub fn insert_revision(
        &self,
        title: &str,
        source: &str,
        revision: u64,
    ) -> Result<ModuleIdentifier, IdentifierError> {
        let identifier = ModuleIdentifier::parse(title)?;
        self.store(ContentBlob::with_identity(
            identifier.clone(),
            source,
            ContentIdentity::from_revision(revision),
        ));
        Ok(identifier)
    }

    pub fn remove(&self, identifier: &ModuleIdentifier) -> bool {
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(identifier)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn store(&self, blob: ContentBlob) {
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(blob.identifier().clone(), blob);
    }
}

impl SourceResolverPort for InMemorySourceResolver {
    fn resolve(&self, identifier: &ModuleIdentifier) -> Result<ContentBlob, ResolveError> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(identifier.clone()))
    }
}
