//! Hardware ports driven by the control loop.

use luabot_domain::GamepadState;

/// Differential drivetrain. Inputs are normalized to `-1.0..=1.0`.
pub trait DriveTrainPort: Send {
    fn drive(&mut self, speed: f64, rotation: f64);

    /// All-stop. This is the neutral output used whenever scripts cannot be
    /// trusted to drive.
    fn stop(&mut self) {
        self.drive(0.0, 0.0);
    }
}

/// Operator controller.
pub trait GamepadPort: Send {
    fn is_connected(&self) -> bool;

    /// Copy the current raw values into `state`.
    fn read(&mut self, state: &mut GamepadState);
}
