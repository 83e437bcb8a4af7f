//! Hardware adapters.
//!
//! Only simulated hardware ships with the host; it records what it was told
//! so the binary and tests can observe actuator output.

mod sim;

pub use sim::{ShooterOutput, SimDrivetrain, SimGamepad, SimShooterMotors};
