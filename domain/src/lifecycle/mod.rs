//! Lifecycle hook names
//!
//! A bot program is a Lua file whose factory returns a descriptor table.
//! The host only looks at the keys defined here; any other key in the
//! descriptor is ignored. The set is closed: adding a hook means adding a
//! variant, not accepting arbitrary strings at runtime.

use crate::core::error::DomainError;

/// A named, optional callback a bot program may define.
///
/// Two conventions coexist. Generic programs use `init`, `prepare`, `run`
/// and `cleanup` for every mode; phase-specific programs use a triad per
/// mode (`teleop_init`, `teleop`, `teleop_exit`, ...). A program may mix
/// both; absent hooks are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    Init,
    Prepare,
    Run,
    Cleanup,
    TeleopInit,
    Teleop,
    TeleopExit,
    AutonomousInit,
    Autonomous,
    AutonomousExit,
    TestInit,
    Test,
    TestExit,
}

/// How the caller treats the result of a lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStyle {
    /// Result is consulted; a failure aborts entering (or leaving) a phase.
    MustSucceed,
    /// Result is logged and dropped; used for best-effort periodic steps.
    FireAndForget,
}

impl LifecycleHook {
    /// Number of recognized hooks.
    pub const COUNT: usize = 13;

    /// Every recognized hook, in declaration order.
    pub const ALL: [LifecycleHook; Self::COUNT] = [
        Self::Init,
        Self::Prepare,
        Self::Run,
        Self::Cleanup,
        Self::TeleopInit,
        Self::Teleop,
        Self::TeleopExit,
        Self::AutonomousInit,
        Self::Autonomous,
        Self::AutonomousExit,
        Self::TestInit,
        Self::Test,
        Self::TestExit,
    ];

    /// Key looked up in the descriptor table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Prepare => "prepare",
            Self::Run => "run",
            Self::Cleanup => "cleanup",
            Self::TeleopInit => "teleop_init",
            Self::Teleop => "teleop",
            Self::TeleopExit => "teleop_exit",
            Self::AutonomousInit => "autonomous_init",
            Self::Autonomous => "autonomous",
            Self::AutonomousExit => "autonomous_exit",
            Self::TestInit => "test_init",
            Self::Test => "test",
            Self::TestExit => "test_exit",
        }
    }

    /// Stable slot index, usable for array-backed hook tables.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether the hook runs every tick rather than at a phase boundary.
    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Run | Self::Teleop | Self::Autonomous | Self::Test)
    }

    /// Default call style: periodic steps are fire-and-forget, phase
    /// transitions must succeed.
    pub fn call_style(&self) -> CallStyle {
        if self.is_periodic() {
            CallStyle::FireAndForget
        } else {
            CallStyle::MustSucceed
        }
    }
}

impl std::str::FromStr for LifecycleHook {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|hook| hook.as_str() == s)
            .ok_or_else(|| DomainError::UnknownLifecycleHook(s.to_string()))
    }
}

impl std::fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
