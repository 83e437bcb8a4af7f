//! Protected calls into Lua.
//!
//! mlua runs every call under `lua_pcall`, so faults arrive as `LuaError`
//! values. This module turns them into `ScriptError`s and tells script
//! faults apart from faults raised inside native capability functions.

use luabot_application::{ScriptError, ScriptErrorKind};
use mlua::prelude::*;

/// Classify an mlua error by origin.
pub(crate) fn classify(err: &LuaError) -> ScriptErrorKind {
    match err {
        LuaError::SyntaxError { .. } => ScriptErrorKind::Syntax,
        LuaError::CallbackError { .. } | LuaError::ExternalError(_) => ScriptErrorKind::Native,
        _ => ScriptErrorKind::Runtime,
    }
}

/// Innermost cause of a callback error chain.
fn root_cause(err: &LuaError) -> &LuaError {
    match err {
        LuaError::CallbackError { cause, .. } => root_cause(cause),
        other => other,
    }
}

/// Convert an mlua error to a ScriptError.
pub(crate) fn lua_to_script_error(err: LuaError) -> ScriptError {
    let kind = classify(&err);
    let message = match kind {
        ScriptErrorKind::Native => root_cause(&err).to_string(),
        _ => err.to_string(),
    };
    ScriptError::new(kind, message)
}

/// Call `func` with no arguments, discarding its results.
pub(crate) fn call_protected(func: &LuaFunction) -> Result<(), ScriptError> {
    func.call::<()>(()).map_err(lua_to_script_error)
}
