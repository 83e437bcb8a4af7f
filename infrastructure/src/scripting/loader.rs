//! Bot program loader.
//!
//! A bot program is a Lua file that evaluates to a factory function. The
//! factory returns a descriptor table whose entries are the lifecycle
//! callbacks:
//!
//! ```lua
//! return function()
//!     local M = {}
//!     function M.init() end
//!     function M.teleop() bot.drivetrain.drive(0.5, 0.0) end
//!     return M
//! end
//! ```
//!
//! Callbacks are captured once at load time. Missing callbacks are fine;
//! keys that are not lifecycle names are ignored.

use luabot_application::{InvokeOutcome, ScriptError, ScriptErrorKind, ScriptModulePort};
use luabot_domain::LifecycleHook;
use mlua::prelude::*;
use std::path::Path;
use tracing::debug;

use super::invoke::{call_protected, lua_to_script_error};

/// A loaded bot program and its captured callbacks.
pub struct ScriptModule {
    name: String,
    hooks: [Option<LuaFunction>; LifecycleHook::COUNT],
    error: String,
    error_kind: Option<ScriptErrorKind>,
}

impl ScriptModule {
    /// Load the program at `path`. Failures are recorded on the returned
    /// module rather than returned.
    pub fn load(lua: &Lua, path: &Path) -> Self {
        Self::load_named(lua, path, path.display().to_string())
    }

    pub(crate) fn load_named(lua: &Lua, path: &Path, name: String) -> Self {
        let mut module = Self {
            name,
            hooks: std::array::from_fn(|_| None),
            error: String::new(),
            error_kind: None,
        };

        match Self::capture(lua, path) {
            Ok(hooks) => {
                module.hooks = hooks;
                debug!(
                    target: "lua",
                    "{}: callbacks [{}]",
                    module.name,
                    module
                        .hooks()
                        .map(|h| h.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            Err(err) => {
                module.error = err.message;
                module.error_kind = Some(err.kind);
            }
        }
        module
    }

    fn capture(
        lua: &Lua,
        path: &Path,
    ) -> Result<[Option<LuaFunction>; LifecycleHook::COUNT], ScriptError> {
        if !path.is_file() {
            return Err(ScriptError::new(
                ScriptErrorKind::FileNotFound,
                format!("file does not exist: {}", path.display()),
            ));
        }

        // Lua source is bytes; string literals need not be UTF-8
        let content = std::fs::read(path).map_err(|e| {
            ScriptError::new(
                ScriptErrorKind::Io,
                format!("could not read {}: {}", path.display(), e),
            )
        })?;

        let chunk = lua
            .load(content.as_slice())
            .set_name(format!("@{}", path.display()))
            .into_function()
            .map_err(|e| ScriptError::new(ScriptErrorKind::Syntax, e.to_string()))?;

        let factory = match chunk.call::<LuaValue>(()).map_err(lua_to_script_error)? {
            LuaValue::Function(f) => f,
            _ => {
                return Err(ScriptError::new(
                    ScriptErrorKind::NotAFactory,
                    "did not get a factory function",
                ));
            }
        };

        let descriptor = match factory.call::<LuaValue>(()).map_err(lua_to_script_error)? {
            LuaValue::Table(t) => t,
            _ => {
                return Err(ScriptError::new(
                    ScriptErrorKind::NotADescriptor,
                    "did not get a descriptor table",
                ));
            }
        };

        let mut hooks: [Option<LuaFunction>; LifecycleHook::COUNT] = std::array::from_fn(|_| None);
        for hook in LifecycleHook::ALL {
            if let LuaValue::Function(f) = descriptor
                .get::<LuaValue>(hook.as_str())
                .map_err(lua_to_script_error)?
            {
                hooks[hook.index()] = Some(f);
            }
        }
        Ok(hooks)
    }

    /// Hooks the descriptor defines, in declaration order.
    pub fn hooks(&self) -> impl Iterator<Item = LifecycleHook> + '_ {
        LifecycleHook::ALL
            .into_iter()
            .filter(|hook| self.hooks[hook.index()].is_some())
    }

    fn load_failed(&self) -> bool {
        self.error_kind.is_some_and(|k| k.is_load_error())
    }
}

impl ScriptModulePort for ScriptModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn error(&self) -> &str {
        &self.error
    }

    fn error_kind(&self) -> Option<ScriptErrorKind> {
        self.error_kind
    }

    fn has_hook(&self, hook: LifecycleHook) -> bool {
        self.hooks[hook.index()].is_some()
    }

    fn invoke(&mut self, hook: LifecycleHook) -> Result<InvokeOutcome, ScriptError> {
        if self.load_failed() {
            return Ok(InvokeOutcome::Skipped);
        }
        self.error.clear();
        self.error_kind = None;
        let Some(func) = &self.hooks[hook.index()] else {
            return Ok(InvokeOutcome::Skipped);
        };

        match call_protected(func) {
            Ok(()) => Ok(InvokeOutcome::Completed),
            Err(err) => {
                self.error = err.message.clone();
                self.error_kind = Some(err.kind);
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ScriptModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptModule")
            .field("name", &self.name)
            .field("hooks", &self.hooks().collect::<Vec<_>>())
            .field("error", &self.error)
            .finish()
    }
}
