//! Shooter sequencer
//!
//! Controls the wheels used to load game pieces and shoot them. It is a
//! small state machine with three states: `Idle`, `Loading` and
//! `Shooting`. Idle can transition to Loading or Shooting and both return
//! to Idle, either when their tick budget runs out or on `stop()`. Loading
//! and Shooting never transition directly into each other, which prevents
//! load/shoot overlaps.
//!
//! Shooting runs in two sub-phases: a warm-up where only the primary wheels
//! spin, followed by full power on primary and secondary wheels.

mod settings;

pub use settings::{DEFAULT_PERIOD_MS, ShooterSettings};

/// State of the shooter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerState {
    /// Not loading, not shooting.
    #[default]
    Idle,
    /// Pulling a game piece in.
    Loading,
    /// Spinning up and firing.
    Shooting,
}

/// Hardware outputs driven by the shooter, in volts.
pub trait ShooterMotors: Send {
    fn set_primary(&mut self, volts: f64);
    fn set_secondary(&mut self, volts: f64);
}

/// The shooter state machine. Call [`Shooter::process`] once per control
/// tick.
pub struct Shooter {
    state: SequencerState,
    settings: ShooterSettings,
    motors: Box<dyn ShooterMotors>,
    remaining: u32,
    warmup_ticks: u32,
    elapsed: u32,
}

impl Shooter {
    pub fn new(settings: ShooterSettings, motors: Box<dyn ShooterMotors>) -> Self {
        Self {
            state: SequencerState::Idle,
            settings,
            motors,
            remaining: 0,
            warmup_ticks: 0,
            elapsed: 0,
        }
    }

    /// Back to Idle with new settings.
    pub fn reset(&mut self, settings: ShooterSettings) {
        self.settings = settings;
        self.state = SequencerState::Idle;
        self.remaining = 0;
        self.warmup_ticks = 0;
        self.elapsed = 0;
    }

    /// Start loading if idle.
    pub fn load(&mut self) {
        if self.state != SequencerState::Idle {
            return;
        }
        self.state = SequencerState::Loading;
        self.remaining = self.settings.intake_ticks();
        self.elapsed = 0;
    }

    /// Alias of [`Shooter::load`].
    pub fn intake(&mut self) {
        self.load();
    }

    /// Start shooting if idle.
    pub fn shoot(&mut self) {
        if self.state != SequencerState::Idle {
            return;
        }
        self.state = SequencerState::Shooting;
        self.remaining = self.settings.shoot_ticks();
        self.warmup_ticks = self.settings.warmup_ticks();
        self.elapsed = 0;
    }

    /// Stop immediately.
    pub fn stop(&mut self) {
        self.state = SequencerState::Idle;
        self.remaining = 0;
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SequencerState::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.state == SequencerState::Loading
    }

    pub fn is_shooting(&self) -> bool {
        self.state == SequencerState::Shooting
    }

    pub fn settings(&self) -> &ShooterSettings {
        &self.settings
    }

    /// Ticks left before the current sequence returns to Idle.
    pub fn remaining_ticks(&self) -> u32 {
        self.remaining
    }

    /// Length of the warm-up sub-phase of the current shot.
    pub fn warmup_ticks(&self) -> u32 {
        self.warmup_ticks
    }

    /// Whether the current shot is still warming up.
    pub fn is_warming_up(&self) -> bool {
        self.is_shooting() && self.elapsed < self.warmup_ticks
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            SequencerState::Shooting => "shoot!",
            SequencerState::Loading => "load!",
            SequencerState::Idle => "idle...",
        }
    }

    /// Apply the output for the current state and advance the countdown.
    pub fn process(&mut self) {
        match self.state {
            SequencerState::Loading => {
                self.motors
                    .set_primary(-self.settings.intake_primary_power.abs());
                self.motors
                    .set_secondary(-self.settings.intake_secondary_power.abs());
            }
            SequencerState::Shooting => {
                let volts = self.settings.shoot_power.abs();
                self.motors.set_primary(volts);
                if self.elapsed >= self.warmup_ticks {
                    self.motors.set_secondary(volts);
                } else {
                    self.motors.set_secondary(0.0);
                }
            }
            SequencerState::Idle => {
                self.motors.set_primary(0.0);
                self.motors.set_secondary(0.0);
            }
        }

        if self.state != SequencerState::Idle {
            self.elapsed += 1;
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.state = SequencerState::Idle;
            }
        }
    }
}

impl std::fmt::Debug for Shooter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shooter")
            .field("state", &self.state)
            .field("remaining", &self.remaining)
            .field("warmup_ticks", &self.warmup_ticks)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}
