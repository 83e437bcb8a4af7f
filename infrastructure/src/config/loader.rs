//! Host configuration loader with multi-source merging

use super::host_config::{HostConfig, HostConfigError};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file name.
pub const PROJECT_CONFIG: &str = "luabot.toml";

/// Configuration loader that handles file discovery and merging
pub struct HostConfigLoader;

impl HostConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `LUABOT_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./luabot.toml`
    /// 4. Global: `~/.config/luabot/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<HostConfig, HostConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(HostConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        let project = PathBuf::from(PROJECT_CONFIG);
        if project.exists() {
            figment = figment.merge(Toml::file(&project));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        Self::finish(figment.merge(Env::prefixed("LUABOT_").split("__")))
    }

    /// Load from a single file plus defaults, ignoring global/project files
    /// and the environment.
    pub fn load_file(path: &Path) -> Result<HostConfig, HostConfigError> {
        Self::finish(
            Figment::new()
                .merge(Serialized::defaults(HostConfig::default()))
                .merge(Toml::file(path)),
        )
    }

    fn finish(figment: Figment) -> Result<HostConfig, HostConfigError> {
        let config: HostConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("luabot").join("config.toml"))
    }

    /// Describe the config file locations being used, in priority order.
    pub fn config_sources(explicit: Option<&Path>) -> Vec<(String, PathBuf, bool)> {
        let mut sources = Vec::new();
        if let Some(path) = explicit {
            sources.push(("Explicit".to_string(), path.to_path_buf(), path.exists()));
        }
        let project = PathBuf::from(PROJECT_CONFIG);
        let found = project.exists();
        sources.push(("Project".to_string(), project, found));
        if let Some(global) = Self::global_config_path() {
            let found = global.exists();
            sources.push(("Global".to_string(), global, found));
        }
        sources
    }
}
