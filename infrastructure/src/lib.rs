//! Infrastructure layer for luabot
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the Lua runtime, native bindings, simulated hardware
//! and host configuration loading.

pub mod bindings;
pub mod config;
pub mod hardware;
pub mod scripting;

// Re-export commonly used types
pub use bindings::{DrivetrainBinding, GamepadBinding, ShooterBinding};
pub use config::{HostConfig, HostConfigError, HostConfigLoader};
pub use hardware::{ShooterOutput, SimDrivetrain, SimGamepad, SimShooterMotors};
pub use scripting::{
    CapabilityRegistry, CapabilitySet, EngineError, LuaConfigBridge, NativeBinding,
    ScriptEngine, ScriptModule,
};
