//! Render sessions.
//!
//! A [`RenderSession`] scopes everything one page render needs: the sandbox,
//! the module cache and the quota. The host creates one when a render starts,
//! passes it by `&mut` into every dispatcher call and drops it at render end.
//! Nothing in a session is shared with another session, so sessions can run
//! on separate worker threads without locking.

use crate::cache::{CacheError, ModuleCache};
use crate::ports::scripting_engine::{SandboxError, SandboxPort, ScriptEnginePort};
use crate::ports::source_resolver::SourceResolverPort;
use std::sync::Arc;
use std::time::Duration;
use wikiscript_domain::{LoadedModule, ModuleIdentifier, QuotaUsage, ResourceQuota, ScriptValue};

/// Dispatcher-side statistics of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Every dispatcher call, including ones that failed before reaching the sandbox.
    pub invocations: u32,
    pub failures: u32,
    /// Wall time spent in the dispatcher, argument expansion included.
    pub elapsed: Duration,
}

pub struct RenderSession {
    engine_name: String,
    quota: ResourceQuota,
    sandbox: Box<dyn SandboxPort>,
    cache: ModuleCache,
    stats: SessionStats,
}

impl RenderSession {
    /// Start a session with a fresh sandbox from the engine.
    pub fn new(engine: &dyn ScriptEnginePort, quota: ResourceQuota) -> Result<Self, SandboxError> {
        let sandbox = engine.new_sandbox(&quota)?;
        Ok(Self::with_sandbox(engine.name(), sandbox, quota))
    }

    pub fn with_sandbox(
        engine_name: impl Into<String>,
        sandbox: Box<dyn SandboxPort>,
        quota: ResourceQuota,
    ) -> Self {
        Self {
            engine_name: engine_name.into(),
            cache: ModuleCache::new(quota.max_modules),
            quota,
            sandbox,
            stats: SessionStats::default(),
        }
    }

    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    pub fn quota(&self) -> &ResourceQuota {
        &self.quota
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Quota consumed inside the sandbox.
    pub fn usage(&self) -> QuotaUsage {
        self.sandbox.usage()
    }

    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    pub(crate) fn load_module(
        &mut self,
        identifier: &ModuleIdentifier,
        resolver: &dyn SourceResolverPort,
    ) -> Result<Arc<LoadedModule>, CacheError> {
        self.cache
            .get_or_load(identifier, resolver, self.sandbox.as_mut())
    }

    pub(crate) fn call(
        &mut self,
        module: &LoadedModule,
        function: &str,
        args: &[ScriptValue],
    ) -> Result<Vec<ScriptValue>, SandboxError> {
        self.sandbox.invoke(module, function, args)
    }

    pub(crate) fn record(&mut self, elapsed: Duration, succeeded: bool) {
        self.stats.invocations += 1;
        if !succeeded {
            self.stats.failures += 1;
        }
        self.stats.elapsed += elapsed;
    }
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("engine_name", &self.engine_name)
            .field("quota", &self.quota)
            .field("modules", &self.cache.len())
            .field("stats", &self.stats)
            .finish()
    }
}
