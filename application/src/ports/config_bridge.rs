//! Config bridge port: typed, fallback-safe reads of robot configuration.
//!
//! The robot configuration lives in a script-resident table
//! (`config.<category>.<symbol>`). Every accessor here is total: an absent
//! category, an absent symbol or an empty key degrades to the caller's
//! fallback. Hardware ports and tunables vary per deployment, so a miss is
//! never an error.

use luabot_domain::{DEFAULT_PERIOD_MS, ShooterSettings};

/// A configuration value as seen from native code.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Number(f64),
    String(String),
    Boolean(bool),
    /// A nested table (port map, trajectory, ...). Contents are read
    /// through dedicated accessors.
    Table,
}

impl ConfigValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::String(s) => write!(f, "{}", s),
            ConfigValue::Boolean(b) => write!(f, "{}", b),
            ConfigValue::Table => write!(f, "<table>"),
        }
    }
}

/// Narrow a double to `i32` without faulting.
///
/// NaN yields `fallback`; out of range values saturate; fractions truncate
/// toward zero.
pub fn narrow_to_i32(value: f64, fallback: i32) -> i32 {
    if value.is_nan() {
        return fallback;
    }
    value.trunc().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// Port for read-only robot configuration.
///
/// Implementors provide raw lookups plus the port table; the typed readers
/// are derived from those.
pub trait ConfigBridgePort {
    /// Raw lookup. `None` when either key is empty, the category is not a
    /// table, or the symbol is absent.
    fn get(&self, category: &str, symbol: &str) -> Option<ConfigValue>;

    /// Hardware port index by symbolic name, or -1 when `symbol` is empty
    /// or unknown. Callers must not construct hardware for -1.
    fn port(&self, symbol: &str) -> i32;

    /// Number of declared port symbols.
    fn num_ports(&self) -> i32;

    /// Names of the configured autonomous trajectories, sorted.
    fn trajectory_names(&self) -> Vec<String>;

    /// Lookup in the `general` category.
    fn general(&self, symbol: &str) -> Option<ConfigValue> {
        self.get("general", symbol)
    }

    fn number(&self, category: &str, symbol: &str, fallback: f64) -> f64 {
        self.get(category, symbol)
            .and_then(|v| v.as_f64())
            .unwrap_or(fallback)
    }

    fn integer(&self, category: &str, symbol: &str, fallback: i32) -> i32 {
        match self.get(category, symbol).and_then(|v| v.as_f64()) {
            Some(n) => narrow_to_i32(n, fallback),
            None => fallback,
        }
    }

    fn string(&self, category: &str, symbol: &str, fallback: &str) -> String {
        match self.get(category, symbol) {
            Some(ConfigValue::String(s)) => s,
            _ => fallback.to_string(),
        }
    }

    fn boolean(&self, category: &str, symbol: &str, fallback: bool) -> bool {
        self.get(category, symbol)
            .and_then(|v| v.as_bool())
            .unwrap_or(fallback)
    }

    fn team_name(&self) -> String {
        self.string("general", "team_name", "")
    }

    fn team_number(&self) -> i32 {
        self.integer("general", "team_number", 0)
    }

    fn match_start_position(&self) -> String {
        self.string("general", "match_start_position", "Left")
    }

    fn gamepad_skew_factor(&self) -> f64 {
        self.number("gamepad", "skew_factor", 1.0)
    }

    /// Control loop period in milliseconds.
    fn engine_period_ms(&self) -> i32 {
        self.integer("engine", "period", DEFAULT_PERIOD_MS)
    }

    /// Shooter timing and power, from the `shooter` category.
    fn shooter_settings(&self) -> ShooterSettings {
        let defaults = ShooterSettings::default();
        ShooterSettings::from_seconds(
            self.engine_period_ms(),
            self.number("shooter", "intake_time", defaults.intake_ms as f64 / 1000.0),
            self.number("shooter", "warmup_time", defaults.warmup_ms as f64 / 1000.0),
            self.number("shooter", "shoot_time", defaults.shoot_ms as f64 / 1000.0),
        )
        .with_powers(
            self.number("shooter", "shoot_power", defaults.shoot_power),
            self.number(
                "shooter",
                "intake_primary_power",
                defaults.intake_primary_power,
            ),
            self.number(
                "shooter",
                "intake_secondary_power",
                defaults.intake_secondary_power,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Test-only bridge backed by a flat map of `category.symbol` keys.
    struct MapConfig {
        values: HashMap<String, ConfigValue>,
        ports: Vec<(&'static str, i32)>,
    }

    impl MapConfig {
        fn new() -> Self {
            let mut values = HashMap::new();
            values.insert(
                "general.team_name".to_string(),
                ConfigValue::String("The Gold Standard".into()),
            );
            values.insert(
                "general.team_number".to_string(),
                ConfigValue::Number(9431.0),
            );
            values.insert("engine.period".to_string(), ConfigValue::Number(20.0));
            values.insert("shooter.shoot_time".to_string(), ConfigValue::Number(1.0));
            values.insert("shooter.warmup_time".to_string(), ConfigValue::Number(0.5));
            values.insert("huge.value".to_string(), ConfigValue::Number(1.0e12));
            values.insert("general.ports".to_string(), ConfigValue::Table);
            Self {
                values,
                ports: vec![("gamepad", 0), ("shooter_primary_top", 5)],
            }
        }
    }

    impl ConfigBridgePort for MapConfig {
        fn get(&self, category: &str, symbol: &str) -> Option<ConfigValue> {
            if category.is_empty() || symbol.is_empty() {
                return None;
            }
            self.values.get(&format!("{}.{}", category, symbol)).cloned()
        }

        fn port(&self, symbol: &str) -> i32 {
            self.ports
                .iter()
                .find(|(name, _)| *name == symbol)
                .map(|(_, port)| *port)
                .unwrap_or(-1)
        }

        fn num_ports(&self) -> i32 {
            self.ports.len() as i32
        }

        fn trajectory_names(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_number_fallbacks() {
        let cfg = MapConfig::new();
        assert_eq!(cfg.number("gamepad", "fake", 1001.0), 1001.0);
        assert_eq!(cfg.number("fake", "alsofake", -1002.0), -1002.0);
        assert_eq!(cfg.number("", "period", 3.0), 3.0);
        assert_eq!(cfg.number("engine", "", 4.0), 4.0);
        assert_eq!(cfg.number("engine", "period", 0.0), 20.0);
    }

    #[test]
    fn test_integer_narrows_safely() {
        let cfg = MapConfig::new();
        assert_eq!(cfg.integer("huge", "value", 7), i32::MAX);
        assert_eq!(cfg.integer("general", "team_number", 0), 9431);
        // wrong type falls back
        assert_eq!(cfg.integer("general", "team_name", 12), 12);
    }

    #[test]
    fn test_narrow_to_i32() {
        assert_eq!(narrow_to_i32(f64::NAN, 5), 5);
        assert_eq!(narrow_to_i32(-1.0e20, 0), i32::MIN);
        assert_eq!(narrow_to_i32(2.9, 0), 2);
        assert_eq!(narrow_to_i32(-2.9, 0), -2);
    }

    #[test]
    fn test_domain_readers() {
        let cfg = MapConfig::new();
        assert_eq!(cfg.team_name(), "The Gold Standard");
        assert_eq!(cfg.team_number(), 9431);
        assert_eq!(cfg.match_start_position(), "Left");
        assert_eq!(cfg.gamepad_skew_factor(), 1.0);
        assert_eq!(cfg.engine_period_ms(), 20);
    }

    #[test]
    fn test_table_values_are_not_strings() {
        let cfg = MapConfig::new();
        assert_eq!(cfg.general("ports"), Some(ConfigValue::Table));
        assert_eq!(cfg.string("general", "ports", "none"), "none");
    }

    #[test]
    fn test_shooter_settings_from_config() {
        let cfg = MapConfig::new();
        let settings = cfg.shooter_settings();
        assert_eq!(settings.period_ms, 20);
        assert_eq!(settings.warmup_ms, 500);
        assert_eq!(settings.shoot_ms, 1000);
        assert_eq!(settings.intake_ms, 600);
        assert_eq!(settings.shoot_ticks(), 75);
    }

    #[test]
    fn test_ports() {
        let cfg = MapConfig::new();
        assert_eq!(cfg.port(""), -1);
        assert_eq!(cfg.port("invalid_____index____not_good"), -1);
        assert_eq!(cfg.port("shooter_primary_top"), 5);
        assert_eq!(cfg.num_ports(), 2);
    }
}
