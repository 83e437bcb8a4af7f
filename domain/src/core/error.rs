//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown lifecycle hook: {0}")]
    UnknownLifecycleHook(String),

    #[error("Unknown bot mode: {0}")]
    UnknownBotMode(String),

    #[error("Invalid shooter settings: {0}")]
    InvalidShooterSettings(String),
}
