//! Script engine: the one Lua runtime of the process.
//!
//! `ScriptEngine` is a guard: constructing a second one while the first is
//! alive fails with [`EngineError::AlreadyConstructed`], and dropping it
//! frees the runtime so a new one can be built. Everything that talks to
//! Lua receives the engine (or its `&Lua`) explicitly.

use luabot_application::{ConfigBridgePort, ScriptLoaderPort, ScriptModulePort};
use mlua::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::config_bridge::{CONFIG_GLOBAL, LuaConfigBridge};
use super::loader::ScriptModule;
use super::registry::{CapabilityRegistry, NativeBinding};

static ENGINE_ALIVE: AtomicBool = AtomicBool::new(false);

/// Name of the config module probed for during bootstrap.
pub const DEFAULT_MARKER: &str = "config.lua";

/// File extension of bot programs.
pub const PROGRAM_EXTENSION: &str = "bot";

/// Errors from the script engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("a script engine already exists in this process")]
    AlreadyConstructed,

    #[error("lua error: {0}")]
    Lua(#[from] LuaError),
}

/// Append the Lua module qualifiers to a search directory.
///
/// `/home/lvuser/deploy` becomes
/// `/home/lvuser/deploy/?.lua;/home/lvuser/deploy/?/init.lua`.
pub fn with_search_qualifiers(dir: &Path) -> String {
    let d = dir.display();
    format!("{d}/?.lua;{d}/?/init.lua")
}

/// Owner of the Lua state and the capability registry.
pub struct ScriptEngine {
    lua: Lua,
    registry: CapabilityRegistry,
    search_dir: Option<PathBuf>,
    bootstrapped: bool,
}

impl ScriptEngine {
    /// Create the runtime with the standard library open.
    pub fn new() -> Result<Self, EngineError> {
        if ENGINE_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EngineError::AlreadyConstructed);
        }

        let engine = Self {
            lua: Lua::new(),
            registry: CapabilityRegistry::new(),
            search_dir: None,
            bootstrapped: false,
        };
        debug!(target: "lua", "{} initialized", engine.version());
        Ok(engine)
    }

    /// Whether an engine is alive in this process.
    pub fn is_alive() -> bool {
        ENGINE_ALIVE.load(Ordering::Acquire)
    }

    /// Free the runtime now.
    pub fn shutdown(self) {
        drop(self);
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// The interpreter version, e.g. `Lua 5.4`.
    pub fn version(&self) -> String {
        self.lua
            .globals()
            .get::<String>("_VERSION")
            .unwrap_or_else(|_| "Lua".to_string())
    }

    /// Point `package.path` at `dir`. Empty input is ignored.
    pub fn set_search_path(&mut self, dir: &Path) -> Result<(), EngineError> {
        if dir.as_os_str().is_empty() {
            return Ok(());
        }
        let package: LuaTable = self.lua.globals().get("package")?;
        package.set("path", with_search_qualifiers(dir))?;
        self.search_dir = Some(dir.to_path_buf());
        debug!(target: "lua", "search path: {}", dir.display());
        Ok(())
    }

    /// Directory bot programs and modules are loaded from.
    pub fn search_directory(&self) -> Option<&Path> {
        self.search_dir.as_deref()
    }

    /// Find the script root and load the config module.
    ///
    /// Unless a search path was set explicitly, the first of `candidates`
    /// containing `marker` becomes the search path. Returns `false` (after
    /// logging) when no root is found or `config` fails to load. Calling it
    /// again after a success does nothing.
    pub fn bootstrap(&mut self, candidates: &[PathBuf], marker: &str) -> bool {
        if self.bootstrapped {
            return true;
        }

        if self.search_dir.is_none() {
            let Some(root) = candidates.iter().find(|dir| dir.join(marker).is_file()) else {
                error!(target: "lua", "could not find {} in any script directory", marker);
                for dir in candidates {
                    debug!(target: "lua", "  tried {}", dir.display());
                }
                return false;
            };
            let root = root.clone();
            if let Err(e) = self.set_search_path(&root) {
                error!(target: "lua", "could not set search path: {}", e);
                return false;
            }
        }

        if let Err(e) = self
            .lua
            .load(format!("{CONFIG_GLOBAL} = require('config')"))
            .set_name("=bootstrap")
            .exec()
        {
            error!(target: "lua", "could not load config: {}", e);
            return false;
        }

        let config = self.config();
        info!(
            target: "lua",
            "config loaded for {} ({})",
            config.team_name(),
            config.team_number()
        );
        self.bootstrapped = true;
        true
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Typed view of the loaded `config` table.
    pub fn config(&self) -> LuaConfigBridge<'_> {
        LuaConfigBridge::new(&self.lua)
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Publish a native subsystem under `bot.<module>`.
    pub fn bind(&mut self, binding: &dyn NativeBinding) -> Result<(), EngineError> {
        self.registry
            .publish(&self.lua, binding.module(), binding.capabilities())?;
        Ok(())
    }

    /// Retract a native subsystem. Call before dropping it.
    pub fn unbind(&mut self, binding: &dyn NativeBinding) -> Result<(), EngineError> {
        self.registry
            .retract(&self.lua, binding.module(), binding.symbols())?;
        Ok(())
    }

    /// Resolve a program name against the search directory. Names with a
    /// directory component are used as given.
    pub fn resolve_program(&self, program: &str) -> PathBuf {
        let path = Path::new(program);
        if path.is_absolute() || path.components().count() > 1 {
            return path.to_path_buf();
        }
        match &self.search_dir {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Load a bot program. See [`ScriptModule::load`].
    pub fn load(&self, program: &str) -> ScriptModule {
        let path = self.resolve_program(program);
        let module = ScriptModule::load_named(&self.lua, &path, program.to_string());
        if module.have_error() {
            warn!(target: "lua", "{}: {}", program, module.error());
        }
        module
    }
}

impl Drop for ScriptEngine {
    fn drop(&mut self) {
        ENGINE_ALIVE.store(false, Ordering::Release);
    }
}

impl ScriptLoaderPort for ScriptEngine {
    fn load_program(&self, program: &str) -> Box<dyn ScriptModulePort> {
        Box::new(self.load(program))
    }

    fn list_programs(&self) -> Vec<String> {
        let Some(dir) = &self.search_dir else {
            return Vec::new();
        };
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(target: "lua", "cannot list {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut programs: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(PROGRAM_EXTENSION)
            })
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        programs.sort();
        programs
    }

    fn collect_garbage(&self) {
        if let Err(e) = self.lua.gc_collect() {
            warn!(target: "lua", "garbage collection failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luabot_application::{InvokeOutcome, ScriptErrorKind};
    use luabot_domain::{LifecycleHook, NeutralReturn};
    use serial_test::serial;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    use crate::scripting::registry::CapabilitySet;

    fn robot_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.lua"),
            r#"
            local M = {}
            M.general = { team_name = "The Gold Standard", team_number = 9431 }
            M.engine = { period = 20 }
            return M
            "#,
        )
        .unwrap();
        fs::write(
            dir.path().join("teleop.bot"),
            r#"
            return function()
                return {
                    teleop = function() bot.probe.hit() end,
                }
            end
            "#,
        )
        .unwrap();
        fs::write(dir.path().join("b_test.bot"), "return function() return {} end").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a program").unwrap();
        dir
    }

    struct Probe {
        hits: Arc<Mutex<u32>>,
    }

    impl NativeBinding for Probe {
        fn module(&self) -> &'static str {
            "probe"
        }

        fn symbols(&self) -> &'static [&'static str] {
            &["hit", "hits"]
        }

        fn capabilities(&self) -> CapabilitySet {
            let hit = Arc::clone(&self.hits);
            let read = Arc::clone(&self.hits);
            CapabilitySet::new()
                .action("hit", move || {
                    *hit.lock().unwrap() += 1;
                    Ok(())
                })
                .function("hits", NeutralReturn::Zero, move |_, ()| {
                    Ok(*read.lock().unwrap())
                })
        }
    }

    #[test]
    #[serial]
    fn test_second_engine_is_rejected() {
        let engine = ScriptEngine::new().unwrap();
        assert!(ScriptEngine::is_alive());
        assert!(matches!(
            ScriptEngine::new(),
            Err(EngineError::AlreadyConstructed)
        ));

        engine.shutdown();
        assert!(!ScriptEngine::is_alive());
        let again = ScriptEngine::new();
        assert!(again.is_ok());
    }

    #[test]
    #[serial]
    fn test_version() {
        let engine = ScriptEngine::new().unwrap();
        assert!(engine.version().starts_with("Lua 5.4"));
    }

    #[test]
    fn test_search_qualifiers() {
        assert_eq!(
            with_search_qualifiers(Path::new("/deploy")),
            "/deploy/?.lua;/deploy/?/init.lua"
        );
    }

    #[test]
    #[serial]
    fn test_empty_search_path_is_ignored() {
        let mut engine = ScriptEngine::new().unwrap();
        engine.set_search_path(Path::new("")).unwrap();
        assert!(engine.search_directory().is_none());
    }

    #[test]
    #[serial]
    fn test_bootstrap_probes_candidates() {
        let robot = robot_dir();
        let empty = TempDir::new().unwrap();
        let mut engine = ScriptEngine::new().unwrap();

        let candidates = vec![empty.path().to_path_buf(), robot.path().to_path_buf()];
        assert!(engine.bootstrap(&candidates, DEFAULT_MARKER));
        assert_eq!(engine.search_directory(), Some(robot.path()));
        assert_eq!(engine.config().team_number(), 9431);

        // idempotent
        assert!(engine.bootstrap(&[], DEFAULT_MARKER));
    }

    #[test]
    #[serial]
    fn test_bootstrap_fails_without_config() {
        let empty = TempDir::new().unwrap();
        let mut engine = ScriptEngine::new().unwrap();
        assert!(!engine.bootstrap(&[empty.path().to_path_buf()], DEFAULT_MARKER));
        assert!(!engine.is_bootstrapped());
    }

    #[test]
    #[serial]
    fn test_bootstrap_with_explicit_path_and_bad_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.lua"), "error('broken config')").unwrap();
        let mut engine = ScriptEngine::new().unwrap();
        engine.set_search_path(dir.path()).unwrap();
        assert!(!engine.bootstrap(&[], DEFAULT_MARKER));
    }

    #[test]
    #[serial]
    fn test_list_programs() {
        let robot = robot_dir();
        let mut engine = ScriptEngine::new().unwrap();
        assert!(engine.list_programs().is_empty());
        engine.set_search_path(robot.path()).unwrap();
        assert_eq!(engine.list_programs(), vec!["b_test.bot", "teleop.bot"]);
    }

    #[test]
    #[serial]
    fn test_program_calls_bound_capability_then_unbind() {
        let robot = robot_dir();
        let mut engine = ScriptEngine::new().unwrap();
        assert!(engine.bootstrap(&[robot.path().to_path_buf()], DEFAULT_MARKER));

        let probe = Probe {
            hits: Arc::new(Mutex::new(0)),
        };
        engine.bind(&probe).unwrap();

        let mut program = engine.load_program("teleop.bot");
        assert!(!program.have_error(), "{}", program.error());
        assert_eq!(program.invoke(LifecycleHook::Teleop), Ok(InvokeOutcome::Completed));
        assert_eq!(*probe.hits.lock().unwrap(), 1);

        engine.unbind(&probe).unwrap();
        assert!(!engine.registry().is_live("probe", "hit"));
        assert_eq!(program.invoke(LifecycleHook::Teleop), Ok(InvokeOutcome::Completed));
        assert_eq!(*probe.hits.lock().unwrap(), 1);

        let hits: f64 = engine.lua().load("return bot.probe.hits()").eval().unwrap();
        assert_eq!(hits, 0.0);
        engine.collect_garbage();
    }

    fn deployed_robot() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../robot")
    }

    #[test]
    #[serial]
    fn test_deployed_config_contract() {
        let mut engine = ScriptEngine::new().unwrap();
        assert!(engine.bootstrap(&[deployed_robot()], DEFAULT_MARKER));

        let config = engine.config();
        assert_eq!(config.team_name(), "The Gold Standard");
        assert_eq!(config.engine_period_ms(), 20);

        let ports = [
            "gamepad",
            "joystick",
            "drive_left_leader",
            "drive_left_follower",
            "drive_right_leader",
            "drive_right_follower",
            "arm_left",
            "arm_right",
            "shooter_secondary_top",
            "shooter_secondary_bottom",
            "shooter_primary_top",
            "shooter_primary_bottom",
        ];
        for port in ports {
            assert!(config.port(port) >= 0, "{port}");
        }
        assert_eq!(config.num_ports(), ports.len() as i32);
        assert_eq!(config.port(""), -1);
        assert_eq!(config.port("invalid_____index____not_good"), -1);
    }

    #[test]
    #[serial]
    fn test_deployed_programs_load() {
        let mut engine = ScriptEngine::new().unwrap();
        assert!(engine.bootstrap(&[deployed_robot()], DEFAULT_MARKER));
        let programs = engine.list_programs();
        assert!(programs.contains(&"teleop.bot".to_string()));

        for name in programs {
            let module = engine.load(&name);
            assert!(!module.have_error(), "{}: {}", name, module.error());
        }
    }

    #[test]
    #[serial]
    fn test_load_missing_program() {
        let robot = robot_dir();
        let mut engine = ScriptEngine::new().unwrap();
        engine.set_search_path(robot.path()).unwrap();
        let module = engine.load("nope.bot");
        assert_eq!(module.error_kind(), Some(ScriptErrorKind::FileNotFound));
        assert!(module.error().contains("nope.bot"));
    }
}
