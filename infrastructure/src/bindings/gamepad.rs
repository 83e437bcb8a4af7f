//! `bot.gamepad`: read-only operator input.
//!
//! Indices are zero based, matching the controller's raw numbering.
//! Out of range reads are neutral.

use luabot_domain::{GAMEPAD_MODULE, GamepadState, NeutralReturn};
use std::sync::{Arc, Mutex};

use super::lock;
use crate::scripting::{CapabilitySet, NativeBinding};

pub const GAMEPAD_SYMBOLS: &[&str] = &["axis", "button", "pov"];

/// Publishes the gamepad snapshot the control loop refreshes every tick.
pub struct GamepadBinding {
    state: Arc<Mutex<GamepadState>>,
}

impl GamepadBinding {
    pub fn new(state: Arc<Mutex<GamepadState>>) -> Self {
        Self { state }
    }
}

impl NativeBinding for GamepadBinding {
    fn module(&self) -> &'static str {
        GAMEPAD_MODULE
    }

    fn symbols(&self) -> &'static [&'static str] {
        GAMEPAD_SYMBOLS
    }

    fn capabilities(&self) -> CapabilitySet {
        let axis = Arc::clone(&self.state);
        let button = Arc::clone(&self.state);
        let pov = Arc::clone(&self.state);

        CapabilitySet::new()
            .function("axis", NeutralReturn::Zero, move |_, index: i64| {
                Ok(lock(&*axis, "gamepad")?.axis_value(index))
            })
            .function("button", NeutralReturn::False, move |_, index: i64| {
                Ok(lock(&*button, "gamepad")?.button_value(index))
            })
            .function("pov", NeutralReturn::Zero, move |_, index: i64| {
                Ok(lock(&*pov, "gamepad")?.pov_value(index) as f64)
            })
    }
}
