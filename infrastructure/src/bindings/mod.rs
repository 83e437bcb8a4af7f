//! Native subsystems exposed to bot programs.
//!
//! Each binding owns shared handles to a subsystem and implements
//! `NativeBinding`, so the engine can publish it under `bot.<module>` and
//! retract it on teardown.

mod drivetrain;
mod gamepad;
mod shooter;

pub use drivetrain::{DRIVETRAIN_SYMBOLS, DrivetrainBinding};
pub use gamepad::{GAMEPAD_SYMBOLS, GamepadBinding};
pub use shooter::{SHOOTER_SYMBOLS, ShooterBinding};

use mlua::prelude::*;
use std::sync::{Mutex, MutexGuard};

/// Lock shared subsystem state from inside a capability function.
fn lock<'a, T: ?Sized>(mutex: &'a Mutex<T>, what: &str) -> LuaResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|e| LuaError::external(format!("{} lock poisoned: {}", what, e)))
}
