//! Host configuration (`luabot.toml`)
//!
//! Settings for the host process itself: where to look for scripts, how
//! fast to tick and which program runs in each mode. Robot tunables live in
//! the Lua `config` module instead.
//!
//! ```toml
//! [scripts]
//! deploy_dir = "/home/lvuser/deploy"
//! marker = "config.lua"
//!
//! [control]
//! ticks = 500
//!
//! [programs]
//! teleop = "teleop.bot"
//! ```

use luabot_domain::BotMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating the host configuration.
#[derive(Error, Debug)]
pub enum HostConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("control.period_ms must be positive, got {0}")]
    InvalidPeriod(i32),

    #[error("control.ticks must be at least 1")]
    ZeroTicks,

    #[error("scripts.marker must not be empty")]
    EmptyMarker,
}

/// `[scripts]`: script root discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Explicit script root. Skips probing when set.
    pub search_path: Option<PathBuf>,
    /// Deploy directory on the robot.
    pub deploy_dir: PathBuf,
    /// Operating directory; `<dir>/robot` is probed. Defaults to the
    /// current directory.
    pub operating_dir: Option<PathBuf>,
    /// Launch directory; `<dir>/robot` is probed. Defaults to the directory
    /// of the executable.
    pub launch_dir: Option<PathBuf>,
    /// File that marks a script root.
    pub marker: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            search_path: None,
            deploy_dir: PathBuf::from("/home/lvuser/deploy"),
            operating_dir: None,
            launch_dir: None,
            marker: "config.lua".to_string(),
        }
    }
}

impl ScriptsConfig {
    /// Directories probed for the marker, in order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let operating = self
            .operating_dir
            .clone()
            .or_else(|| std::env::current_dir().ok());
        let launch = self.launch_dir.clone().or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        });

        let mut dirs = vec![self.deploy_dir.clone()];
        dirs.extend(operating.map(|d| d.join("robot")));
        dirs.extend(launch.map(|d| d.join("robot")));
        dirs
    }
}

/// `[control]`: the control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Overrides `config.engine.period` when set.
    pub period_ms: Option<i32>,
    /// Ticks to run the selected mode for.
    pub ticks: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            period_ms: None,
            ticks: 250,
        }
    }
}

/// `[programs]`: bot program per mode. Empty means none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramsConfig {
    pub teleop: String,
    pub autonomous: String,
    pub test: String,
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            teleop: "teleop.bot".to_string(),
            autonomous: "autonomous.bot".to_string(),
            test: "test.bot".to_string(),
        }
    }
}

impl ProgramsConfig {
    pub fn program_for(&self, mode: BotMode) -> Option<&str> {
        let name = match mode {
            BotMode::Teleop => &self.teleop,
            BotMode::Autonomous => &self.autonomous,
            BotMode::Test => &self.test,
            BotMode::Disabled | BotMode::Disconnected => return None,
        };
        (!name.is_empty()).then_some(name.as_str())
    }
}

/// Complete host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub scripts: ScriptsConfig,
    pub control: ControlConfig,
    pub programs: ProgramsConfig,
}

impl HostConfig {
    pub fn validate(&self) -> Result<(), HostConfigError> {
        if let Some(period) = self.control.period_ms {
            if period <= 0 {
                return Err(HostConfigError::InvalidPeriod(period));
            }
        }
        if self.control.ticks == 0 {
            return Err(HostConfigError::ZeroTicks);
        }
        if self.scripts.marker.trim().is_empty() {
            return Err(HostConfigError::EmptyMarker);
        }
        Ok(())
    }
}
