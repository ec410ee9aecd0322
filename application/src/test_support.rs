//! In-process fakes for the ports, used by the application tests.
//!
//! `FakeEngine` sandboxes treat each non-empty source line as the name of an
//! exported function. A few names have scripted behavior (`hello`, `echo`,
//! `padded`, `fail`, `spin`); any other export returns `name:arg1,arg2`.
//! A source starting with `!` fails to load.

use crate::ports::argument_expander::ArgumentExpander;
use crate::ports::scripting_engine::{SandboxError, SandboxPort, ScriptEnginePort};
use crate::ports::source_resolver::{ResolveError, SourceResolverPort};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wikiscript_domain::{
    ContentBlob, Diagnostic, FunctionHandle, LimitKind, LoadedModule, ModuleIdentifier,
    QuotaUsage, ResourceQuota, ScriptValue, ValidationReport,
};

// ==================== Resolver ====================

#[derive(Default)]
pub struct FakeResolver {
    modules: Mutex<HashMap<ModuleIdentifier, String>>,
    resolves: AtomicUsize,
}

impl FakeResolver {
    pub fn with_module(self, name: &str, source: &str) -> Self {
        self.set(name, source);
        self
    }

    pub fn set(&self, name: &str, source: &str) {
        let id = ModuleIdentifier::parse(name).unwrap();
        self.modules.lock().unwrap().insert(id, source.to_string());
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

impl SourceResolverPort for FakeResolver {
    fn resolve(&self, identifier: &ModuleIdentifier) -> Result<ContentBlob, ResolveError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.modules
            .lock()
            .unwrap()
            .get(identifier)
            .map(|source| ContentBlob::new(identifier.clone(), source.as_str()))
            .ok_or_else(|| ResolveError::NotFound(identifier.clone()))
    }
}

// ==================== Engine / Sandbox ====================

#[derive(Default, Clone)]
pub struct FakeEngine {
    pub loads: Arc<AtomicUsize>,
}

impl FakeEngine {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ScriptEnginePort for FakeEngine {
    fn name(&self) -> &str {
        "Fake"
    }

    fn new_sandbox(&self, quota: &ResourceQuota) -> Result<Box<dyn SandboxPort>, SandboxError> {
        Ok(Box::new(FakeSandbox {
            quota: quota.clone(),
            loads: Arc::clone(&self.loads),
            next_handle: 0,
            functions: HashMap::new(),
            usage: QuotaUsage::default(),
            tripped: None,
        }))
    }

    fn validate(&self, source: &str, _display_name: &str) -> ValidationReport {
        let mut report = ValidationReport::new();
        let lines: Vec<_> = source.lines().enumerate().collect();
        for (i, line) in lines.into_iter().rev() {
            if line.starts_with('!') {
                report.push(Diagnostic::new(line.trim_start_matches('!')).at_line(i as u32 + 1));
            }
        }
        report
    }

    fn is_available(&self) -> bool {
        true
    }
}

pub struct FakeSandbox {
    quota: ResourceQuota,
    loads: Arc<AtomicUsize>,
    next_handle: u64,
    functions: HashMap<u64, String>,
    usage: QuotaUsage,
    tripped: Option<LimitKind>,
}

impl SandboxPort for FakeSandbox {
    fn load(&mut self, blob: &ContentBlob) -> Result<LoadedModule, SandboxError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if blob.source().starts_with('!') {
            return Err(SandboxError::Load(format!(
                "{}: cannot parse",
                blob.identifier()
            )));
        }

        let mut exports = BTreeMap::new();
        for name in blob.source().lines().map(str::trim).filter(|l| !l.is_empty()) {
            self.next_handle += 1;
            self.functions.insert(self.next_handle, name.to_string());
            exports.insert(name.to_string(), FunctionHandle::new(self.next_handle));
        }
        Ok(LoadedModule::new(
            blob.identifier().clone(),
            blob.identity().clone(),
            exports,
        ))
    }

    fn invoke(
        &mut self,
        module: &LoadedModule,
        function: &str,
        args: &[ScriptValue],
    ) -> Result<Vec<ScriptValue>, SandboxError> {
        if let Some(limit) = self.tripped {
            return Err(SandboxError::ResourceExceeded(limit));
        }
        let handle = module
            .function(function)
            .filter(|h| self.functions.contains_key(&h.id()))
            .ok_or_else(|| SandboxError::NoSuchFunction(function.to_string()))?;
        if self.usage.calls >= self.quota.max_calls {
            self.tripped = Some(LimitKind::Calls);
            return Err(SandboxError::ResourceExceeded(LimitKind::Calls));
        }
        self.usage.calls += 1;
        self.usage.time += Duration::from_millis(1);

        let text = |v: &ScriptValue| v.to_display_string();
        match self.functions[&handle.id()].as_str() {
            "hello" => Ok(vec![ScriptValue::String(format!(
                "Hello, {}",
                args.first().map(text).unwrap_or_default()
            ))]),
            "echo" => Ok(args.to_vec()),
            "padded" => Ok(vec![ScriptValue::from("  padded\n")]),
            "fail" => Err(SandboxError::Runtime("boom".to_string())),
            "spin" => {
                self.tripped = Some(LimitKind::Time);
                Err(SandboxError::ResourceExceeded(LimitKind::Time))
            }
            name => Ok(vec![ScriptValue::String(format!(
                "{}:{}",
                name,
                args.iter().map(text).collect::<Vec<_>>().join(",")
            ))]),
        }
    }

    fn usage(&self) -> QuotaUsage {
        self.usage
    }
}

// ==================== Expander ====================

/// Records the order in which nodes were expanded.
#[derive(Default)]
pub struct RecordingExpander {
    pub expanded: RefCell<Vec<String>>,
}

impl ArgumentExpander<&str> for RecordingExpander {
    fn expand(&self, node: &&str) -> String {
        self.expanded.borrow_mut().push(node.to_string());
        node.to_string()
    }
}
