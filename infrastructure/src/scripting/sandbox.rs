//! Lua sandbox: the restricted global environment shared by all modules.
//!
//! Module code is untrusted page content, so the VM only gets the pure
//! libraries plus the read-only clock functions of `os`. Everything that
//! touches files, processes, the loader or the collector is removed.

use mlua::prelude::*;

/// Standard libraries opened in every sandbox VM. `base` is always open.
pub fn sandbox_libs() -> LuaStdLib {
    LuaStdLib::STRING | LuaStdLib::TABLE | LuaStdLib::MATH | LuaStdLib::UTF8 | LuaStdLib::OS
}

/// Apply sandbox restrictions to the Lua VM.
///
/// Removes:
/// - `dofile`, `loadfile`, `load`, `require`: no code loading at run time
/// - `collectgarbage`: memory is the sandbox's concern, not the module's
/// - `print`: modules communicate through return values only
/// - `string.dump`: no bytecode round trips
/// - `io`, `package`, `debug` and every `os` function except the clock ones
///
/// Also locks the string metatable, whose `__index` is the one `string`
/// table behind method calls like `s:upper()`.
pub fn apply_sandbox(lua: &Lua) -> LuaResult<()> {
    lua.load(
        r#"
        dofile = nil
        loadfile = nil
        load = nil
        require = nil
        collectgarbage = nil
        print = nil
        string.dump = nil

        io = nil
        package = nil
        debug = nil

        local os_clock, os_date, os_time, os_difftime = os.clock, os.date, os.time, os.difftime
        os = {
            clock = os_clock,
            date = os_date,
            time = os_time,
            difftime = os_difftime,
        }

        getmetatable("").__metatable = false
    "#,
    )
    .set_name("=sandbox")
    .exec()
}

/// Create the private environment of one module.
///
/// The environment is a copy of the sandbox globals with its own copy of
/// every library table. Nothing in it refers back to the shared globals, so
/// a module can neither plant globals in another module nor replace the
/// library functions another module sees.
pub fn module_environment(lua: &Lua) -> LuaResult<LuaTable> {
    let env = lua.create_table()?;
    lua.globals().for_each(|name: LuaValue, value: LuaValue| {
        let value = match value {
            LuaValue::Table(library) => LuaValue::Table(shallow_copy(lua, &library)?),
            other => other,
        };
        env.raw_set(name, value)
    })?;
    env.raw_set("_G", env.clone())?;
    Ok(env)
}

fn shallow_copy(lua: &Lua, table: &LuaTable) -> LuaResult<LuaTable> {
    let copy = lua.create_table()?;
    table.for_each(|key: LuaValue, value: LuaValue| copy.raw_set(key, value))?;
    Ok(copy)
}
