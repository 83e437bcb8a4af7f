//! Host configuration loading for luabot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LUABOT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./luabot.toml`
//! 4. Global: `~/.config/luabot/config.toml`
//! 5. Default values

mod host_config;
mod loader;

pub use host_config::{ControlConfig, HostConfig, HostConfigError, ProgramsConfig, ScriptsConfig};
pub use loader::{HostConfigLoader, PROJECT_CONFIG};
