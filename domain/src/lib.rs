//! Domain layer for luabot
//!
//! This crate contains the robot's core vocabulary and pure state machines.
//! It has no dependencies on the Lua runtime or on hardware.
//!
//! # Core Concepts
//!
//! ## Lifecycle hooks
//!
//! Bot programs are Lua scripts that return a descriptor table of optional
//! callbacks. [`LifecycleHook`] is the closed set of names the host looks
//! for, and [`CallStyle`] says whether a failure aborts the phase.
//!
//! ## Modes
//!
//! [`BotMode`] maps each field mode onto the hooks that drive it.
//!
//! ## Shooter
//!
//! [`Shooter`] is the Idle → Loading/Shooting → Idle sequencer, ticked once
//! per control period.

pub mod capability;
pub mod core;
pub mod gamepad;
pub mod lifecycle;
pub mod sequencer;

// Re-export commonly used types
pub use capability::{DRIVETRAIN_MODULE, GAMEPAD_MODULE, NeutralReturn, SHOOTER_MODULE};
pub use core::{error::DomainError, mode::BotMode, ticker::MessageTicker};
pub use gamepad::{Axis, Button, GamepadState};
pub use lifecycle::{CallStyle, LifecycleHook};
pub use sequencer::{
    DEFAULT_PERIOD_MS, SequencerState, Shooter, ShooterMotors, ShooterSettings,
};
