//! Lua 5.4 engine: session sandboxes and the syntax validator.
//!
//! `LuaScriptEngine` implements `ScriptEnginePort` from the application
//! layer. Every call to `new_sandbox` builds a fresh VM, so nothing a module
//! does in one render session is visible to another.

use mlua::ChunkMode;
use mlua::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use wikiscript_application::{SandboxError, SandboxPort, ScriptEnginePort};
use wikiscript_domain::{
    ContentBlob, FunctionHandle, LimitKind, LoadedModule, QuotaUsage, ResourceQuota,
    ScriptValue, ValidationReport,
};

use super::quota::QuotaMeter;
use super::sandbox::{apply_sandbox, module_environment, sandbox_libs};
use super::validator;

/// Name shown in limit reports.
pub const ENGINE_NAME: &str = "Lua 5.4";

/// Lua 5.4 engine implementing `ScriptEnginePort`.
///
/// Stateless: it only knows how to build sandboxes and check syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct LuaScriptEngine;

impl LuaScriptEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptEnginePort for LuaScriptEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn new_sandbox(&self, quota: &ResourceQuota) -> Result<Box<dyn SandboxPort>, SandboxError> {
        Ok(Box::new(LuaSandbox::new(quota)?))
    }

    fn validate(&self, source: &str, display_name: &str) -> ValidationReport {
        validator::validate(source, display_name)
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// One session's Lua VM.
///
/// Exported functions are pinned in the Lua registry and handed out as
/// [`FunctionHandle`]s, so loaded modules stay callable for the whole
/// session without holding Lua references outside the VM.
pub struct LuaSandbox {
    lua: Lua,
    meter: QuotaMeter,
    functions: HashMap<u64, LuaRegistryKey>,
    next_handle: u64,
}

impl LuaSandbox {
    /// Build a sandboxed VM bound to `quota`.
    ///
    /// Sets up the VM with:
    /// - the restricted standard library
    /// - the interpreter memory limit
    /// - the instruction hook that enforces the time limit
    pub fn new(quota: &ResourceQuota) -> Result<Self, SandboxError> {
        let lua = Lua::new_with(sandbox_libs(), LuaOptions::default()).map_err(setup_error)?;
        apply_sandbox(&lua).map_err(setup_error)?;

        let meter = QuotaMeter::new(quota);
        meter.observe_memory(lua.used_memory());
        lua.set_memory_limit(quota.max_memory).map_err(setup_error)?;
        meter.install(&lua, quota.check_interval);

        Ok(Self {
            lua,
            meter,
            functions: HashMap::new(),
            next_handle: 0,
        })
    }

    /// Turn the outcome of running Lua code into a sandbox result.
    ///
    /// A tripped limit wins over whatever the code returned, including a
    /// normal return after the module caught the limit error itself.
    fn settle<T>(
        &self,
        outcome: Result<LuaResult<T>, SandboxError>,
        fault: fn(String) -> SandboxError,
    ) -> Result<T, SandboxError> {
        self.meter.observe_memory(self.lua.used_memory());
        let result = outcome?;
        if let Some(limit) = self.meter.tripped() {
            return Err(SandboxError::ResourceExceeded(limit));
        }
        result.map_err(|e| {
            if is_memory_error(&e) {
                SandboxError::ResourceExceeded(self.meter.trip(LimitKind::Memory))
            } else {
                fault(lua_error_message(&e))
            }
        })
    }

    fn register_exports(&mut self, exports: LuaTable) -> LuaResult<BTreeMap<String, FunctionHandle>> {
        let mut pairs = Vec::new();
        exports.for_each(|key: LuaValue, value: LuaValue| {
            pairs.push((key, value));
            Ok(())
        })?;

        let mut handles = BTreeMap::new();
        for (key, value) in pairs {
            let (LuaValue::String(name), LuaValue::Function(function)) = (key, value) else {
                continue;
            };
            let registry_key = self.lua.create_registry_value(function)?;
            self.next_handle += 1;
            self.functions.insert(self.next_handle, registry_key);
            handles.insert(
                name.to_string_lossy().to_string(),
                FunctionHandle::new(self.next_handle),
            );
        }
        Ok(handles)
    }
}

impl SandboxPort for LuaSandbox {
    fn load(&mut self, blob: &ContentBlob) -> Result<LoadedModule, SandboxError> {
        self.meter.ensure_open()?;
        let title = blob.identifier().title();

        let env = module_environment(&self.lua).map_err(setup_error)?;
        let chunk = self
            .lua
            .load(blob.source())
            .set_name(format!("={}", title))
            .set_mode(ChunkMode::Text)
            .set_environment(env)
            .into_function();
        let chunk = self.settle(Ok(chunk), SandboxError::Load)?;

        let outcome = self.meter.run(|| chunk.call::<LuaValue>(()));
        let returned = self.settle(outcome, SandboxError::Load)?;

        let exports = match returned {
            LuaValue::Table(exports) => exports,
            other => {
                return Err(SandboxError::Load(format!(
                    "{} returned {} instead of an export table",
                    title,
                    lua_type_name(&other)
                )));
            }
        };
        let handles = self
            .register_exports(exports)
            .map_err(|e| SandboxError::Load(lua_error_message(&e)))?;

        debug!(module = %title, exports = handles.len(), "Lua module loaded");
        Ok(LoadedModule::new(
            blob.identifier().clone(),
            blob.identity().clone(),
            handles,
        ))
    }

    fn invoke(
        &mut self,
        module: &LoadedModule,
        function: &str,
        args: &[ScriptValue],
    ) -> Result<Vec<ScriptValue>, SandboxError> {
        self.meter.ensure_open()?;
        let key = module
            .function(function)
            .and_then(|handle| self.functions.get(&handle.id()))
            .ok_or_else(|| SandboxError::NoSuchFunction(function.to_string()))?;
        self.meter.count_call()?;

        let callable: LuaFunction = self
            .lua
            .registry_value(key)
            .map_err(|e| SandboxError::Runtime(lua_error_message(&e)))?;
        let lua_args = args
            .iter()
            .map(|value| script_to_lua(&self.lua, value))
            .collect::<LuaResult<LuaMultiValue>>()
            .map_err(|e| SandboxError::Runtime(lua_error_message(&e)))?;

        let outcome = self.meter.run(|| callable.call::<LuaMultiValue>(lua_args));
        let returned = self.settle(outcome, SandboxError::Runtime)?;

        returned
            .into_iter()
            .map(|value| lua_to_script(value, function))
            .collect()
    }

    fn usage(&self) -> QuotaUsage {
        self.meter.usage()
    }
}

// ==================== Conversions ====================

fn script_to_lua(lua: &Lua, value: &ScriptValue) -> LuaResult<LuaValue> {
    Ok(match value {
        ScriptValue::String(s) => LuaValue::String(lua.create_string(s)?),
        ScriptValue::Integer(n) => LuaValue::Integer(*n),
        ScriptValue::Number(n) => LuaValue::Number(*n),
        ScriptValue::Boolean(b) => LuaValue::Boolean(*b),
        ScriptValue::Nil => LuaValue::Nil,
    })
}

fn lua_to_script(value: LuaValue, function: &str) -> Result<ScriptValue, SandboxError> {
    match value {
        LuaValue::Nil => Ok(ScriptValue::Nil),
        LuaValue::Boolean(b) => Ok(ScriptValue::Boolean(b)),
        LuaValue::Integer(n) => Ok(ScriptValue::Integer(n)),
        LuaValue::Number(n) => Ok(ScriptValue::Number(n)),
        LuaValue::String(s) => Ok(ScriptValue::String(s.to_string_lossy().to_string())),
        other => Err(SandboxError::Runtime(format!(
            "function {} returned a {}, expected a string",
            function,
            lua_type_name(&other)
        ))),
    }
}

/// The name Lua's own `type()` gives a value (integers are "number").
fn lua_type_name(value: &LuaValue) -> &'static str {
    match value {
        LuaValue::Integer(_) | LuaValue::Number(_) => "number",
        other => other.type_name(),
    }
}

fn is_memory_error(error: &LuaError) -> bool {
    match error {
        LuaError::MemoryError(_) => true,
        LuaError::CallbackError { cause, .. } => is_memory_error(cause),
        _ => false,
    }
}

/// Convert an mlua error to the message shown to page authors.
///
/// Callback wrappers and stack tracebacks are dropped; only the innermost
/// message with its position remains.
fn lua_error_message(error: &LuaError) -> String {
    let message = match error {
        LuaError::CallbackError { cause, .. } => return lua_error_message(cause),
        LuaError::SyntaxError { message, .. } | LuaError::RuntimeError(message) => {
            message.clone()
        }
        other => other.to_string(),
    };
    message
        .split("\nstack traceback:")
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn setup_error(e: LuaError) -> SandboxError {
    SandboxError::Setup(e.to_string())
}
