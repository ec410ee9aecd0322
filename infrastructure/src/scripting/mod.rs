//! Lua module engine (feature-gated: `scripting`)
//!
//! Provides the `LuaScriptEngine` that implements `ScriptEnginePort`
//! from the application layer, backed by mlua (Lua 5.4).
//!
//! # Modules
//!
//! - `sandbox`: restricted globals and per-module environments
//! - `quota`: time/memory/call metering via the instruction hook
//! - `validator`: syntax checking with multi-error recovery
//! - `lua_engine`: engine and session sandbox tying everything together

mod lua_engine;
mod quota;
mod sandbox;
mod validator;

pub use lua_engine::{ENGINE_NAME, LuaSandbox, LuaScriptEngine};
pub use validator::MAX_DIAGNOSTICS;
