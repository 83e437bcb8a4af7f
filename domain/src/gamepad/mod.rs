//! Operator input snapshot.
//!
//! The control loop copies raw axis, button and POV values from the
//! controller into a [`GamepadState`] every tick. Scripts read it through the
//! `bot.gamepad` capability module.

/// Max number of axes supported.
pub const MAX_AXES: usize = 32;
/// Max number of POVs (d-pads) supported.
pub const MAX_POVS: usize = 1;
/// Max number of buttons supported.
pub const MAX_BUTTONS: usize = 16;

/// Named axis indices of an Xbox-style controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    LeftStickX = 0,
    LeftStickY = 1,
    TriggerLeft = 2,
    TriggerRight = 3,
    RightStickX = 4,
    RightStickY = 5,
}

/// Named button indices (zero based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A = 0,
    B = 1,
    X = 2,
    Y = 3,
    RightBumper = 4,
    LeftBumper = 5,
    Back = 6,
    Start = 7,
    Home = 8,
    L3 = 9,
    R3 = 10,
}

/// Raw controller values for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadState {
    pub axes: [f64; MAX_AXES],
    pub povs: [i32; MAX_POVS],
    pub buttons: [bool; MAX_BUTTONS],
}

impl Default for GamepadState {
    fn default() -> Self {
        Self {
            axes: [0.0; MAX_AXES],
            povs: [0; MAX_POVS],
            buttons: [false; MAX_BUTTONS],
        }
    }
}

impl GamepadState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Axis by raw index; out of range reads as 0.0.
    pub fn axis_value(&self, index: i64) -> f64 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.axes.get(i).copied())
            .unwrap_or(0.0)
    }

    /// Button by raw index; out of range reads as released.
    pub fn button_value(&self, index: i64) -> bool {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.buttons.get(i).copied())
            .unwrap_or(false)
    }

    /// POV by raw index; out of range reads as 0.
    pub fn pov_value(&self, index: i64) -> i32 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.povs.get(i).copied())
            .unwrap_or(0)
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        self.axes[axis as usize]
    }

    pub fn button(&self, button: Button) -> bool {
        self.buttons[button as usize]
    }

    /// Indices whose axis value differs from `previous`, for change logging.
    pub fn changed_axes(&self, previous: &GamepadState) -> Vec<usize> {
        self.axes
            .iter()
            .zip(previous.axes.iter())
            .enumerate()
            .filter(|(_, (now, before))| now != before)
            .map(|(i, _)| i)
            .collect()
    }
}
