//! `ConfigBridgePort` over the Lua `config` global.
//!
//! Bootstrap runs `config = require('config')`; everything here reads that
//! table and never writes it. Lookups are total: any Lua error, wrong type
//! or missing key becomes `None` (and from there the caller's fallback).

use luabot_application::{ConfigBridgePort, ConfigValue, narrow_to_i32};
use mlua::prelude::*;

/// Name of the global holding the robot configuration.
pub const CONFIG_GLOBAL: &str = "config";

/// Read-only view of `config` in one Lua state.
pub struct LuaConfigBridge<'lua> {
    lua: &'lua Lua,
}

impl<'lua> LuaConfigBridge<'lua> {
    pub fn new(lua: &'lua Lua) -> Self {
        Self { lua }
    }

    fn config_table(&self) -> Option<LuaTable> {
        match self.lua.globals().get::<LuaValue>(CONFIG_GLOBAL) {
            Ok(LuaValue::Table(t)) => Some(t),
            _ => None,
        }
    }

    fn sub_table(&self, key: &str) -> Option<LuaTable> {
        match self.config_table()?.get::<LuaValue>(key) {
            Ok(LuaValue::Table(t)) => Some(t),
            _ => None,
        }
    }

    /// `config.<name>` if it is a function.
    fn config_function(&self, name: &str) -> Option<LuaFunction> {
        match self.config_table()?.get::<LuaValue>(name) {
            Ok(LuaValue::Function(f)) => Some(f),
            _ => None,
        }
    }

    /// Whether a config module has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.config_table().is_some()
    }
}

fn to_config_value(value: LuaValue) -> Option<ConfigValue> {
    match value {
        LuaValue::Number(n) => Some(ConfigValue::Number(n)),
        LuaValue::Integer(i) => Some(ConfigValue::Number(i as f64)),
        LuaValue::Boolean(b) => Some(ConfigValue::Boolean(b)),
        LuaValue::String(s) => s.to_str().ok().map(|s| ConfigValue::String(s.to_string())),
        LuaValue::Table(_) => Some(ConfigValue::Table),
        _ => None,
    }
}

fn to_port(value: LuaValue) -> i32 {
    let raw = match value {
        LuaValue::Integer(i) => i as f64,
        LuaValue::Number(n) => n,
        _ => return -1,
    };
    let port = narrow_to_i32(raw, -1);
    if port < 0 { -1 } else { port }
}

impl ConfigBridgePort for LuaConfigBridge<'_> {
    fn get(&self, category: &str, symbol: &str) -> Option<ConfigValue> {
        if category.is_empty() || symbol.is_empty() {
            return None;
        }
        let value = self.sub_table(category)?.get::<LuaValue>(symbol).ok()?;
        to_config_value(value)
    }

    fn port(&self, symbol: &str) -> i32 {
        if symbol.is_empty() {
            return -1;
        }

        let value = match self.config_function("port") {
            Some(f) => f.call::<LuaValue>(symbol),
            None => match self.sub_table("ports") {
                Some(ports) => ports.get::<LuaValue>(symbol),
                None => return -1,
            },
        };
        value.map(to_port).unwrap_or(-1)
    }

    fn num_ports(&self) -> i32 {
        if let Some(f) = self.config_function("num_ports") {
            return match f.call::<LuaValue>(()) {
                Ok(LuaValue::Integer(i)) => narrow_to_i32(i as f64, 0).max(0),
                Ok(LuaValue::Number(n)) => narrow_to_i32(n, 0).max(0),
                _ => 0,
            };
        }

        self.sub_table("ports")
            .map(|ports| ports.pairs::<LuaValue, LuaValue>().count() as i32)
            .unwrap_or(0)
    }

    fn trajectory_names(&self) -> Vec<String> {
        let Some(table) = self.sub_table("trajectories") else {
            return Vec::new();
        };
        let mut names: Vec<String> = table
            .pairs::<String, LuaValue>()
            .filter_map(|pair| pair.ok().map(|(name, _)| name))
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        local M = {}
        M.general = {
            team_name = "The Gold Standard",
            team_number = 9431,
            simulate = true,
        }
        M.engine = { period = 20 }
        M.gamepad = { skew_factor = 2.5 }
        M.shooter = { warmup_time = 0.5, shoot_time = 1.0, shoot_power = 11.0 }
        M.ports = {
            gamepad = 0,
            drive_left_leader = 1,
            drive_left_follower = 2,
            bogus = -7,
        }
        M.trajectories = { straight = {}, curve = {}, back = {} }
        return M
    "#;

    fn load(source: &str) -> Lua {
        let lua = Lua::new();
        let config: LuaValue = lua.load(source).eval().unwrap();
        lua.globals().set(CONFIG_GLOBAL, config).unwrap();
        lua
    }

    #[test]
    fn test_get_and_fallbacks() {
        let lua = load(FIXTURE);
        let cfg = LuaConfigBridge::new(&lua);
        assert!(cfg.is_loaded());
        assert_eq!(cfg.team_name(), "The Gold Standard");
        assert_eq!(cfg.team_number(), 9431);
        assert!(cfg.boolean("general", "simulate", false));
        assert_eq!(cfg.gamepad_skew_factor(), 2.5);
        assert_eq!(cfg.match_start_position(), "Left");

        assert_eq!(cfg.number("gamepad", "fake", 1001.0), 1001.0);
        assert_eq!(cfg.number("fake", "alsofake", -1002.0), -1002.0);
        assert_eq!(cfg.number("", "period", 5.0), 5.0);
        assert_eq!(cfg.get("engine", ""), None);
        assert_eq!(cfg.get("ports", "gamepad"), Some(ConfigValue::Number(0.0)));
        assert_eq!(cfg.general("trajectories"), None);
    }

    #[test]
    fn test_shooter_settings() {
        let lua = load(FIXTURE);
        let settings = LuaConfigBridge::new(&lua).shooter_settings();
        assert_eq!(settings.shoot_power, 11.0);
        assert_eq!(settings.shoot_ticks(), 75);
        assert_eq!(settings.warmup_ticks(), 25);
        assert_eq!(settings.intake_ticks(), 30);
    }

    #[test]
    fn test_ports_from_table() {
        let lua = load(FIXTURE);
        let cfg = LuaConfigBridge::new(&lua);
        assert_eq!(cfg.port("drive_left_follower"), 2);
        assert_eq!(cfg.port(""), -1);
        assert_eq!(cfg.port("invalid_____index____not_good"), -1);
        assert_eq!(cfg.port("bogus"), -1);
        assert_eq!(cfg.num_ports(), 4);
    }

    #[test]
    fn test_ports_from_functions() {
        let lua = load(
            r#"
            local M = { ports = { a = 3, b = 4 } }
            function M.port(sym) return M.ports[sym] or -1 end
            function M.num_ports() return 2 end
            return M
        "#,
        );
        let cfg = LuaConfigBridge::new(&lua);
        assert_eq!(cfg.port("b"), 4);
        assert_eq!(cfg.port("zzz"), -1);
        assert_eq!(cfg.num_ports(), 2);
    }

    #[test]
    fn test_faulting_port_function_is_a_miss() {
        let lua = load(
            r#"
            local M = {}
            function M.port(sym) error("nope") end
            return M
        "#,
        );
        let cfg = LuaConfigBridge::new(&lua);
        assert_eq!(cfg.port("gamepad"), -1);
        assert_eq!(cfg.num_ports(), 0);
    }

    #[test]
    fn test_trajectory_names_sorted() {
        let lua = load(FIXTURE);
        let cfg = LuaConfigBridge::new(&lua);
        assert_eq!(cfg.trajectory_names(), vec!["back", "curve", "straight"]);
    }

    #[test]
    fn test_no_config_loaded() {
        let lua = Lua::new();
        let cfg = LuaConfigBridge::new(&lua);
        assert!(!cfg.is_loaded());
        assert_eq!(cfg.team_number(), 0);
        assert_eq!(cfg.team_name(), "");
        assert_eq!(cfg.engine_period_ms(), 20);
        assert_eq!(cfg.num_ports(), 0);
        assert!(cfg.trajectory_names().is_empty());
    }
}
