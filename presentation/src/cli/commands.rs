//! CLI command definitions

use clap::{Parser, ValueEnum};
use luabot_domain::BotMode;
use std::path::PathBuf;

/// Mode to run the bot program in
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Operator control
    Teleop,
    /// Autonomous period
    Autonomous,
    /// Test mode (a failed step stops the program)
    Test,
    /// Robot disabled; outputs held neutral
    Disabled,
}

impl From<ModeArg> for BotMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Teleop => BotMode::Teleop,
            ModeArg::Autonomous => BotMode::Autonomous,
            ModeArg::Test => BotMode::Test,
            ModeArg::Disabled => BotMode::Disabled,
        }
    }
}

/// CLI arguments for luabot
#[derive(Parser, Debug)]
#[command(name = "luabot")]
#[command(author, version, about = "Lua scripting host for a competition robot")]
#[command(long_about = r#"
luabot runs Lua bot programs against the robot's subsystems on a fixed
control period, using simulated hardware.

At startup the script root is located by probing for config.lua in:
1. the deploy directory
2. <current dir>/robot
3. <executable dir>/robot
then `config = require('config')` loads the robot configuration.

Configuration files are loaded from (in priority order):
1. LUABOT_* environment variables
2. --config <path>     Explicit config file
3. ./luabot.toml       Project-level config
4. ~/.config/luabot/config.toml   Global config

Example:
  luabot --mode teleop --ticks 500
  luabot --mode test --program engine_test.bot -vv
  luabot --scripts ./robot --list-programs
"#)]
pub struct Cli {
    /// Mode to run
    #[arg(short, long, value_enum, default_value = "teleop")]
    pub mode: ModeArg,

    /// Bot program to load (defaults to the one configured for the mode)
    #[arg(short, long, value_name = "FILE")]
    pub program: Option<String>,

    /// Number of control ticks to run
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Control period in milliseconds (overrides config.engine.period)
    #[arg(long, value_name = "MS")]
    pub period: Option<i32>,

    /// Script root (skips probing for config.lua)
    #[arg(short, long, value_name = "DIR")]
    pub scripts: Option<PathBuf>,

    /// Run ticks back to back instead of waiting for the period
    #[arg(long)]
    pub fast: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List the bot programs in the script root and exit
    #[arg(long)]
    pub list_programs: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
