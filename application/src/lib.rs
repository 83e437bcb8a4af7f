//! Application layer for luabot
//!
//! This crate contains the port definitions and the mode controller use case.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    config_bridge::{ConfigBridgePort, ConfigValue, narrow_to_i32},
    hardware::{DriveTrainPort, GamepadPort},
    scripting_engine::{
        InvokeOutcome, ScriptError, ScriptErrorKind, ScriptLoaderPort, ScriptModulePort,
    },
};
pub use use_cases::mode_controller::{ModeController, TickOutcome};
