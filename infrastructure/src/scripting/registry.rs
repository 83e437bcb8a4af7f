//! Capability registry: the `bot` global namespace.
//!
//! Native subsystems publish named modules of functions into `bot.<module>`
//! and retract them before they go away. Retraction never removes a symbol:
//! each function is swapped for a stand-in returning a neutral value, and
//! every function handed out earlier is switched off through a shared
//! liveness flag, so a script that kept a reference gets the neutral value
//! too.
//!
//! ```lua
//! local shoot = bot.shooter.shoot
//! bot.shooter.load()
//! if bot.shooter.is_idle() then shoot() end
//! ```

use luabot_domain::NeutralReturn;
use mlua::prelude::*;
use mlua::{FromLuaMulti, IntoLuaMulti};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Name of the root namespace global.
pub const ROOT_TABLE: &str = "bot";

type BuildFn = Box<dyn FnOnce(&Lua, Arc<AtomicBool>) -> LuaResult<LuaFunction>>;

struct Capability {
    name: String,
    neutral: NeutralReturn,
    build: BuildFn,
}

/// Builder for the functions of one capability module.
#[derive(Default)]
pub struct CapabilitySet {
    entries: Vec<Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A command with no arguments and no results. Retracts to a no-op.
    pub fn action<F>(self, name: &str, f: F) -> Self
    where
        F: Fn() -> LuaResult<()> + Send + 'static,
    {
        self.function(name, NeutralReturn::Nothing, move |_, ()| f())
    }

    /// A numeric getter. Retracts to `0.0`.
    pub fn number<F>(self, name: &str, f: F) -> Self
    where
        F: Fn() -> LuaResult<f64> + Send + 'static,
    {
        self.function(name, NeutralReturn::Zero, move |_, ()| f())
    }

    /// A predicate. Retracts to `false`.
    pub fn boolean<F>(self, name: &str, f: F) -> Self
    where
        F: Fn() -> LuaResult<bool> + Send + 'static,
    {
        self.function(name, NeutralReturn::False, move |_, ()| f())
    }

    /// A function with arbitrary arguments and results. `neutral` is what
    /// it returns once retracted.
    pub fn function<A, R, F>(mut self, name: &str, neutral: NeutralReturn, f: F) -> Self
    where
        A: FromLuaMulti + 'static,
        R: IntoLuaMulti + 'static,
        F: Fn(&Lua, A) -> LuaResult<R> + Send + 'static,
    {
        let build: BuildFn = Box::new(move |lua: &Lua, live: Arc<AtomicBool>| {
            lua.create_function(move |lua, args: LuaMultiValue| {
                if !live.load(Ordering::Acquire) {
                    return neutral_values(lua, neutral);
                }
                let args = A::from_lua_multi(args, lua)?;
                f(lua, args)?.into_lua_multi(lua)
            })
        });
        self.entries.push(Capability {
            name: name.to_string(),
            neutral,
            build,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name.as_str()).collect()
    }
}

fn neutral_values(lua: &Lua, neutral: NeutralReturn) -> LuaResult<LuaMultiValue> {
    match neutral {
        NeutralReturn::Nothing => Ok(LuaMultiValue::new()),
        NeutralReturn::Zero => 0.0_f64.into_lua_multi(lua),
        NeutralReturn::False => false.into_lua_multi(lua),
    }
}

fn neutral_stand_in(lua: &Lua, neutral: NeutralReturn) -> LuaResult<LuaFunction> {
    lua.create_function(move |lua, _: LuaMultiValue| neutral_values(lua, neutral))
}

struct PublishedSymbol {
    neutral: NeutralReturn,
    live: Arc<AtomicBool>,
}

/// A native subsystem that exposes itself to scripts.
pub trait NativeBinding {
    /// Module name under `bot`.
    fn module(&self) -> &'static str;

    /// Every symbol the module publishes.
    fn symbols(&self) -> &'static [&'static str];

    /// Fresh capability functions bound to this subsystem.
    fn capabilities(&self) -> CapabilitySet;
}

/// Owner of everything published under `bot`.
#[derive(Default)]
pub struct CapabilityRegistry {
    modules: HashMap<String, BTreeMap<String, PublishedSymbol>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `bot` table, created on first use.
    fn root(lua: &Lua) -> LuaResult<LuaTable> {
        match lua.globals().get::<LuaValue>(ROOT_TABLE)? {
            LuaValue::Table(t) => Ok(t),
            _ => {
                let t = lua.create_table()?;
                lua.globals().set(ROOT_TABLE, t.clone())?;
                Ok(t)
            }
        }
    }

    /// The module table under `bot`, recreated if a script clobbered it.
    fn module_table(lua: &Lua, module: &str) -> LuaResult<LuaTable> {
        let root = Self::root(lua)?;
        match root.get::<LuaValue>(module)? {
            LuaValue::Table(t) => Ok(t),
            _ => {
                let t = lua.create_table()?;
                root.set(module, t.clone())?;
                Ok(t)
            }
        }
    }

    /// Create or replace `bot.<module>`. Functions from a previous publish
    /// of the same module go inert.
    pub fn publish(&mut self, lua: &Lua, module: &str, set: CapabilitySet) -> LuaResult<()> {
        if let Some(previous) = self.modules.remove(module) {
            for symbol in previous.values() {
                symbol.live.store(false, Ordering::Release);
            }
        }

        let table = lua.create_table()?;
        let mut published = BTreeMap::new();
        for capability in set.entries {
            let live = Arc::new(AtomicBool::new(true));
            let func = (capability.build)(lua, Arc::clone(&live))?;
            table.set(capability.name.as_str(), func)?;
            published.insert(
                capability.name,
                PublishedSymbol {
                    neutral: capability.neutral,
                    live,
                },
            );
        }

        Self::root(lua)?.set(module, table)?;
        info!(target: "bindings", "published bot.{} ({} symbols)", module, published.len());
        self.modules.insert(module.to_string(), published);
        Ok(())
    }

    /// Swap the named symbols of `module` for neutral stand-ins. Unknown
    /// modules and symbols are ignored.
    pub fn retract(&mut self, lua: &Lua, module: &str, symbols: &[&str]) -> LuaResult<()> {
        let Some(published) = self.modules.get(module) else {
            debug!(target: "bindings", "retract: bot.{} was never published", module);
            return Ok(());
        };

        let table = Self::module_table(lua, module)?;
        let mut count = 0;
        for name in symbols {
            let Some(symbol) = published.get(*name) else {
                continue;
            };
            symbol.live.store(false, Ordering::Release);
            table.set(*name, neutral_stand_in(lua, symbol.neutral)?)?;
            count += 1;
        }

        info!(target: "bindings", "retracted {} symbols from bot.{}", count, module);
        Ok(())
    }

    /// Retract every symbol ever published in `module`.
    pub fn retract_all(&mut self, lua: &Lua, module: &str) -> LuaResult<()> {
        let names: Vec<String> = self.symbols(module);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        self.retract(lua, module, &refs)
    }

    /// Whether `module.symbol` is published and not retracted.
    pub fn is_live(&self, module: &str, symbol: &str) -> bool {
        self.modules
            .get(module)
            .and_then(|m| m.get(symbol))
            .is_some_and(|s| s.live.load(Ordering::Acquire))
    }

    /// Published symbols of `module`, sorted.
    pub fn symbols(&self, module: &str) -> Vec<String> {
        self.modules
            .get(module)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Published module names, sorted.
    pub fn modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }
}
