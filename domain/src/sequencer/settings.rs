//! Timing and power settings for the shooter sequencer.

use crate::core::error::DomainError;

/// Control period used when none is configured.
pub const DEFAULT_PERIOD_MS: i32 = 20;

/// Durations are stored in whole milliseconds, powers in volts.
#[derive(Debug, Clone, PartialEq)]
pub struct ShooterSettings {
    pub period_ms: i32,
    pub intake_ms: i32,
    pub warmup_ms: i32,
    pub shoot_ms: i32,
    pub shoot_power: f64,
    pub intake_primary_power: f64,
    pub intake_secondary_power: f64,
}

impl Default for ShooterSettings {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            intake_ms: 600,
            warmup_ms: 500,
            shoot_ms: 1000,
            shoot_power: 12.0,
            intake_primary_power: 6.0,
            intake_secondary_power: 3.0,
        }
    }
}

impl ShooterSettings {
    /// Build timing from durations in seconds, the unit used by `config.lua`.
    pub fn from_seconds(period_ms: i32, intake: f64, warmup: f64, shoot: f64) -> Self {
        Self {
            period_ms,
            intake_ms: seconds_to_ms(intake),
            warmup_ms: seconds_to_ms(warmup),
            shoot_ms: seconds_to_ms(shoot),
            ..Self::default()
        }
    }

    pub fn with_powers(mut self, shoot: f64, intake_primary: f64, intake_secondary: f64) -> Self {
        self.shoot_power = shoot;
        self.intake_primary_power = intake_primary;
        self.intake_secondary_power = intake_secondary;
        self
    }

    /// Ticks needed to cover `duration_ms`, rounded up and never below one.
    pub fn ticks_for(&self, duration_ms: i32) -> u32 {
        // non-positive periods would divide by zero
        let period = self.period_ms.max(1) as u32;
        let duration = duration_ms.max(0) as u32;
        duration.div_ceil(period).max(1)
    }

    pub fn intake_ticks(&self) -> u32 {
        self.ticks_for(self.intake_ms)
    }

    pub fn warmup_ticks(&self) -> u32 {
        self.ticks_for(self.warmup_ms)
    }

    pub fn shoot_ticks(&self) -> u32 {
        self.ticks_for(self.warmup_ms.saturating_add(self.shoot_ms))
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.intake_ms < 0 || self.warmup_ms < 0 || self.shoot_ms < 0 {
            return Err(DomainError::InvalidShooterSettings(
                "durations cannot be negative".to_string(),
            ));
        }
        for power in [
            self.shoot_power,
            self.intake_primary_power,
            self.intake_secondary_power,
        ] {
            if !power.is_finite() {
                return Err(DomainError::InvalidShooterSettings(format!(
                    "power must be finite, got {}",
                    power
                )));
            }
        }
        Ok(())
    }
}

fn seconds_to_ms(seconds: f64) -> i32 {
    if !seconds.is_finite() {
        return 0;
    }
    (seconds * 1000.0)
        .round()
        .clamp(i32::MIN as f64, i32::MAX as f64) as i32
}
