use luabot_application::{DriveTrainPort, GamepadPort};
use luabot_domain::{Axis, Button, GamepadState, ShooterMotors};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Last voltages applied to the shooter wheels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShooterOutput {
    pub primary: f64,
    pub secondary: f64,
}

/// Shooter wheels that only remember their voltages.
#[derive(Debug, Clone, Default)]
pub struct SimShooterMotors {
    output: Arc<Mutex<ShooterOutput>>,
}

impl SimShooterMotors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded output; stays valid after the motors
    /// are moved into a `Shooter`.
    pub fn output(&self) -> Arc<Mutex<ShooterOutput>> {
        Arc::clone(&self.output)
    }
}

impl ShooterMotors for SimShooterMotors {
    fn set_primary(&mut self, volts: f64) {
        self.output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .primary = volts;
    }

    fn set_secondary(&mut self, volts: f64) {
        self.output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .secondary = volts;
    }
}

/// Drivetrain that records the last command.
#[derive(Debug, Clone, Default)]
pub struct SimDrivetrain {
    speed: f64,
    rotation: f64,
    commands: usize,
}

impl SimDrivetrain {
    /// Last `(speed, rotation)` command.
    pub fn last(&self) -> (f64, f64) {
        (self.speed, self.rotation)
    }

    /// Number of commands received.
    pub fn commands(&self) -> usize {
        self.commands
    }

    pub fn is_stopped(&self) -> bool {
        self.speed == 0.0 && self.rotation == 0.0
    }
}

impl DriveTrainPort for SimDrivetrain {
    fn drive(&mut self, speed: f64, rotation: f64) {
        if (speed, rotation) != (self.speed, self.rotation) {
            trace!(target: "bot", "drive speed={:.3} rotation={:.3}", speed, rotation);
        }
        self.speed = speed;
        self.rotation = rotation;
        self.commands += 1;
    }
}

/// A controller that replays a fixed pattern: the left stick sweeps back
/// and forth and A is pressed once every `press_every` reads.
#[derive(Debug, Clone)]
pub struct SimGamepad {
    connected: bool,
    press_every: u64,
    reads: u64,
}

impl SimGamepad {
    pub fn new(press_every: u64) -> Self {
        Self {
            connected: true,
            press_every: press_every.max(1),
            reads: 0,
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for SimGamepad {
    fn default() -> Self {
        Self::new(50)
    }
}

impl GamepadPort for SimGamepad {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn read(&mut self, state: &mut GamepadState) {
        self.reads += 1;
        let phase = (self.reads % 100) as f64 / 100.0;
        state.axes[Axis::LeftStickY as usize] = (phase * std::f64::consts::TAU).sin() * -0.5;
        state.buttons[Button::A as usize] = self.reads % self.press_every == 0;
    }
}
