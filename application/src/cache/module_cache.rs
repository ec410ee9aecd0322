use crate::ports::scripting_engine::{SandboxError, SandboxPort};
use crate::ports::source_resolver::{ResolveError, SourceResolverPort};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use wikiscript_domain::{ContentIdentity, LoadedModule, ModuleIdentifier};

/// Errors from [`ModuleCache::get_or_load`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Load(#[from] SandboxError),

    #[error("module limit of {0} reached")]
    TooManyModules(usize),
}

/// One cached load, successful or not.
///
/// Failed loads are cached too: a module that does not compile is reported
/// from the cache on every later use in the session instead of being
/// recompiled.
#[derive(Debug)]
pub struct CacheEntry {
    identity: ContentIdentity,
    outcome: Result<Arc<LoadedModule>, SandboxError>,
    use_count: u64,
}

impl CacheEntry {
    pub fn identity(&self) -> &ContentIdentity {
        &self.identity
    }

    pub fn module(&self) -> Option<&Arc<LoadedModule>> {
        self.outcome.as_ref().ok()
    }

    pub fn use_count(&self) -> u64 {
        self.use_count
    }
}

/// Loaded modules of one render session.
#[derive(Debug)]
pub struct ModuleCache {
    entries: HashMap<ModuleIdentifier, CacheEntry>,
    max_modules: usize,
    loads: u64,
    hits: u64,
}

impl ModuleCache {
    pub fn new(max_modules: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_modules,
            loads: 0,
            hits: 0,
        }
    }

    /// Return the session's instance of a module, loading it on first use.
    ///
    /// The resolver is consulted on every call. A matching content identity
    /// is a hit; a different identity replaces the stale entry.
    pub fn get_or_load(
        &mut self,
        identifier: &ModuleIdentifier,
        resolver: &dyn SourceResolverPort,
        sandbox: &mut dyn SandboxPort,
    ) -> Result<Arc<LoadedModule>, CacheError> {
        let blob = resolver.resolve(identifier)?;

        let stale = match self.entries.get_mut(identifier) {
            Some(entry) if entry.identity == *blob.identity() => {
                entry.use_count += 1;
                self.hits += 1;
                debug!(module = %identifier, uses = entry.use_count, "Module cache hit");
                return entry.outcome.clone().map_err(CacheError::Load);
            }
            Some(entry) => {
                debug!(
                    module = %identifier,
                    old = %entry.identity,
                    new = %blob.identity(),
                    "Module content changed, replacing cache entry"
                );
                true
            }
            None => false,
        };

        if !stale && self.entries.len() >= self.max_modules {
            warn!(
                module = %identifier,
                limit = self.max_modules,
                "Module limit reached, refusing to load"
            );
            return Err(CacheError::TooManyModules(self.max_modules));
        }

        let outcome = sandbox.load(&blob).map(Arc::new);
        self.loads += 1;
        match &outcome {
            Ok(module) => debug!(
                module = %identifier,
                exports = module.export_names().count(),
                "Loaded module"
            ),
            Err(e) => debug!(module = %identifier, "Module failed to load: {}", e),
        }

        let result = outcome.clone().map_err(CacheError::Load);
        self.entries.insert(
            identifier.clone(),
            CacheEntry {
                identity: blob.identity().clone(),
                outcome,
                use_count: 1,
            },
        );
        result
    }

    pub fn entry(&self, identifier: &ModuleIdentifier) -> Option<&CacheEntry> {
        self.entries.get(identifier)
    }

    /// Number of modules that loaded successfully.
    pub fn loaded(&self) -> usize {
        self.entries.values().filter(|e| e.module().is_some()).count()
    }

    /// Number of distinct modules held, failed loads included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of sandbox loads performed so far.
    pub fn loads(&self) -> u64 {
        self.loads
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }
}
