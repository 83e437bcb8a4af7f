//! Capability module vocabulary.
//!
//! Native subsystems expose functions to scripts under `bot.<module>`.
//! When a subsystem goes away its functions are replaced by inert
//! stand-ins; [`NeutralReturn`] describes what such a stand-in returns.

/// Module name used by the shooter sequencer.
pub const SHOOTER_MODULE: &str = "shooter";
/// Module name used by the drivetrain.
pub const DRIVETRAIN_MODULE: &str = "drivetrain";
/// Module name used by the gamepad.
pub const GAMEPAD_MODULE: &str = "gamepad";

/// Return shape of a retracted capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeutralReturn {
    /// Actions: return nothing.
    #[default]
    Nothing,
    /// Numeric getters: return `0.0`.
    Zero,
    /// Predicates: return `false`.
    False,
}
