//! Bot operating modes.

use crate::core::error::DomainError;
use crate::lifecycle::{CallStyle, LifecycleHook};

/// The running mode of the bot, as selected by the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BotMode {
    #[default]
    Disconnected,
    Autonomous,
    Teleop,
    Disabled,
    Test,
}

impl BotMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Autonomous => "autonomous",
            Self::Teleop => "teleop",
            Self::Disabled => "disabled",
            Self::Test => "test",
        }
    }

    /// Whether a bot program drives this mode.
    pub fn is_scripted(&self) -> bool {
        matches!(self, Self::Autonomous | Self::Teleop | Self::Test)
    }

    /// Mode-specific hook called once when the mode is entered.
    pub fn enter_hook(&self) -> Option<LifecycleHook> {
        match self {
            Self::Autonomous => Some(LifecycleHook::AutonomousInit),
            Self::Teleop => Some(LifecycleHook::TeleopInit),
            Self::Test => Some(LifecycleHook::TestInit),
            Self::Disconnected | Self::Disabled => None,
        }
    }

    /// Mode-specific hook called every tick.
    pub fn periodic_hook(&self) -> Option<LifecycleHook> {
        match self {
            Self::Autonomous => Some(LifecycleHook::Autonomous),
            Self::Teleop => Some(LifecycleHook::Teleop),
            Self::Test => Some(LifecycleHook::Test),
            Self::Disconnected | Self::Disabled => None,
        }
    }

    /// Mode-specific hook called once when the mode is left.
    pub fn exit_hook(&self) -> Option<LifecycleHook> {
        match self {
            Self::Autonomous => Some(LifecycleHook::AutonomousExit),
            Self::Teleop => Some(LifecycleHook::TeleopExit),
            Self::Test => Some(LifecycleHook::TestExit),
            Self::Disconnected | Self::Disabled => None,
        }
    }

    /// How periodic steps are invoked in this mode.
    ///
    /// A failed step latches in every mode. Test mode reports it as an
    /// error to the caller; match modes only log it.
    pub fn periodic_style(&self) -> CallStyle {
        match self {
            Self::Test => CallStyle::MustSucceed,
            _ => CallStyle::FireAndForget,
        }
    }
}

impl std::str::FromStr for BotMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disconnected" => Ok(Self::Disconnected),
            "autonomous" | "auto" => Ok(Self::Autonomous),
            "teleop" => Ok(Self::Teleop),
            "disabled" => Ok(Self::Disabled),
            "test" => Ok(Self::Test),
            other => Err(DomainError::UnknownBotMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for BotMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("teleop".parse::<BotMode>().unwrap(), BotMode::Teleop);
        assert_eq!("Auto".parse::<BotMode>().unwrap(), BotMode::Autonomous);
        assert!("sleep".parse::<BotMode>().is_err());
    }

    #[test]
    fn test_unscripted_modes_have_no_hooks() {
        for mode in [BotMode::Disabled, BotMode::Disconnected] {
            assert!(!mode.is_scripted());
            assert!(mode.enter_hook().is_none());
            assert!(mode.periodic_hook().is_none());
            assert!(mode.exit_hook().is_none());
        }
    }

    #[test]
    fn test_teleop_triad() {
        let mode = BotMode::Teleop;
        assert_eq!(mode.enter_hook(), Some(LifecycleHook::TeleopInit));
        assert_eq!(mode.periodic_hook(), Some(LifecycleHook::Teleop));
        assert_eq!(mode.exit_hook(), Some(LifecycleHook::TeleopExit));
        assert_eq!(mode.periodic_style(), CallStyle::FireAndForget);
    }

    #[test]
    fn test_test_mode_latches() {
        assert_eq!(BotMode::Test.periodic_style(), CallStyle::MustSucceed);
    }
}
