//! Lua scripting host
//!
//! Embeds Lua 5.4 (mlua, vendored) and runs bot programs against native
//! subsystems.
//!
//! # Modules
//!
//! - `engine`: `ScriptEngine`, the process-wide runtime guard and bootstrap
//! - `config_bridge`: typed reads of the Lua `config` table
//! - `registry`: `bot.<module>` capability publish/retract
//! - `loader`: bot program factory/descriptor loading
//! - `invoke`: protected calls and error classification

mod config_bridge;
mod engine;
mod invoke;
mod loader;
mod registry;

pub use config_bridge::{CONFIG_GLOBAL, LuaConfigBridge};
pub use engine::{
    DEFAULT_MARKER, EngineError, PROGRAM_EXTENSION, ScriptEngine, with_search_qualifiers,
};
pub use loader::ScriptModule;
pub use registry::{CapabilityRegistry, CapabilitySet, NativeBinding, ROOT_TABLE};
