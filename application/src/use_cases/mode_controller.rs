//! Mode Controller
//!
//! Drives a bot program through one mode activation: enter, periodic ticks,
//! exit. Script failures never reach the actuators: whenever the program
//! cannot be trusted the drivetrain is forced to all-stop.
//!
//! Error policy: any failure (load, `init`, `prepare`, `<mode>_init` or a
//! periodic step) latches the error, and every tick drives all-stop until the
//! next `enter` loads a program again. Fire-and-forget steps (teleop and
//! autonomous) are logged at `warn`, test-mode steps at `error`.

use crate::ports::config_bridge::ConfigBridgePort;
use crate::ports::hardware::{DriveTrainPort, GamepadPort};
use crate::ports::scripting_engine::{
    InvokeOutcome, ScriptError, ScriptErrorKind, ScriptLoaderPort, ScriptModulePort,
};
use luabot_domain::{
    BotMode, GamepadState, LifecycleHook, MessageTicker, Shooter, ShooterSettings,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, trace, warn};

/// What the controller did with the drivetrain on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The program's periodic step ran and owns the outputs.
    Scripted,
    /// Outputs were forced neutral.
    AllStop,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs bot programs against the shared subsystems.
pub struct ModeController {
    mode: BotMode,
    program: Option<Box<dyn ScriptModulePort>>,
    /// Latched for the activation by a failed must-succeed call.
    latched: Option<ScriptError>,
    shooter: Arc<Mutex<Shooter>>,
    drive: Arc<Mutex<dyn DriveTrainPort>>,
    gamepad: Arc<Mutex<dyn GamepadPort>>,
    gamepad_state: Arc<Mutex<GamepadState>>,
    gamepad_connected: bool,
    period_ms: i32,
    ticker: MessageTicker,
    ticks: u64,
    all_stop_ticks: u64,
}

impl ModeController {
    pub fn new(
        shooter: Arc<Mutex<Shooter>>,
        drive: Arc<Mutex<dyn DriveTrainPort>>,
        gamepad: Arc<Mutex<dyn GamepadPort>>,
        gamepad_state: Arc<Mutex<GamepadState>>,
        period_ms: i32,
    ) -> Self {
        Self {
            mode: BotMode::Disconnected,
            program: None,
            latched: None,
            shooter,
            drive,
            gamepad,
            gamepad_state,
            gamepad_connected: false,
            period_ms,
            ticker: MessageTicker::new("alive", 5, period_ms),
            ticks: 0,
            all_stop_ticks: 0,
        }
    }

    pub fn mode(&self) -> BotMode {
        self.mode
    }

    pub fn period_ms(&self) -> i32 {
        self.period_ms
    }

    /// Ticks run in the current activation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks in the current activation that forced all-stop.
    pub fn all_stop_ticks(&self) -> u64 {
        self.all_stop_ticks
    }

    pub fn program_name(&self) -> Option<&str> {
        self.program.as_ref().map(|p| p.name())
    }

    /// The latched error, if the activation has failed.
    pub fn latched_error(&self) -> Option<&ScriptError> {
        self.latched.as_ref()
    }

    /// Current error text of the program, latched or per-tick.
    pub fn script_error(&self) -> Option<&str> {
        if let Some(err) = &self.latched {
            return Some(&err.message);
        }
        self.program
            .as_ref()
            .filter(|p| p.have_error())
            .map(|p| p.error())
    }

    /// Activate `mode`, loading `program` when the mode is scripted.
    ///
    /// A failure is latched and also returned; the activation stays valid
    /// and every tick drives all-stop.
    pub fn enter(
        &mut self,
        mode: BotMode,
        program: Option<&str>,
        loader: &dyn ScriptLoaderPort,
        config: &dyn ConfigBridgePort,
    ) -> Result<(), ScriptError> {
        info!(target: "bot", "entering {} mode", mode);
        self.mode = mode;
        self.latched = None;
        self.program = None;
        self.ticks = 0;
        self.all_stop_ticks = 0;

        // the loop period is authoritative for sequencer timing
        let mut settings = ShooterSettings {
            period_ms: self.period_ms,
            ..config.shooter_settings()
        };
        if let Err(e) = settings.validate() {
            warn!(target: "shooter", "{}, using defaults", e);
            settings = ShooterSettings {
                period_ms: self.period_ms,
                ..ShooterSettings::default()
            };
        }
        lock(&self.shooter).reset(settings);

        let result = match (mode.is_scripted(), program) {
            (true, Some(name)) => self.start_program(mode, name, loader),
            (true, None) => {
                warn!(target: "bot", "no program configured for {} mode", mode);
                Ok(())
            }
            (false, _) => Ok(()),
        };

        loader.collect_garbage();
        result
    }

    fn start_program(
        &mut self,
        mode: BotMode,
        name: &str,
        loader: &dyn ScriptLoaderPort,
    ) -> Result<(), ScriptError> {
        let mut module = loader.load_program(name);

        if let Some(kind) = module.error_kind() {
            let err = ScriptError::new(kind, module.error());
            error!(target: "lua", "failed to load {}: {}", name, err.message);
            self.program = Some(module);
            self.latched = Some(err.clone());
            return Err(err);
        }

        info!(target: "lua", "loaded program {}", module.name());
        let hooks = [LifecycleHook::Init, LifecycleHook::Prepare]
            .into_iter()
            .chain(mode.enter_hook());
        for hook in hooks {
            if let Err(err) = module.invoke(hook) {
                error!(target: "lua", "{}.{} failed: {}", module.name(), hook, err.message);
                self.program = Some(module);
                self.latched = Some(err.clone());
                return Err(err);
            }
        }

        self.program = Some(module);
        Ok(())
    }

    /// One control period.
    pub fn periodic(&mut self) -> TickOutcome {
        self.ticks += 1;
        if let Some(count) = self.ticker.tick() {
            debug!(
                target: "bot",
                "{} ({}) mode={} ticks={}",
                self.ticker.message(),
                count,
                self.mode,
                self.ticks
            );
        }

        let connected = self.poll_gamepad();
        let outcome = if self.mode.is_scripted() && connected && self.latched.is_none() {
            self.run_step()
        } else {
            TickOutcome::AllStop
        };

        if outcome == TickOutcome::AllStop {
            self.all_stop_ticks += 1;
            lock(&self.drive).stop();
        }
        lock(&self.shooter).process();
        outcome
    }

    fn run_step(&mut self) -> TickOutcome {
        let Some(program) = self.program.as_mut() else {
            return TickOutcome::AllStop;
        };

        // mode-specific step, falling back to the generic one
        let hook = match self.mode.periodic_hook() {
            Some(hook) if program.has_hook(hook) => hook,
            _ => LifecycleHook::Run,
        };

        match program.call(hook, self.mode.periodic_style()) {
            // already logged by `fire`
            Ok(InvokeOutcome::Failed) => {
                let kind = program.error_kind().unwrap_or(ScriptErrorKind::Runtime);
                self.latched = Some(ScriptError::new(kind, program.error()));
                TickOutcome::AllStop
            }
            Ok(_) => TickOutcome::Scripted,
            Err(err) => {
                error!(target: "lua", "{}.{} failed: {}", program.name(), hook, err.message);
                self.latched = Some(err);
                TickOutcome::AllStop
            }
        }
    }

    fn poll_gamepad(&mut self) -> bool {
        let mut gamepad = lock(&self.gamepad);
        let connected = gamepad.is_connected();
        if connected != self.gamepad_connected {
            if connected {
                info!(target: "bot", "gamepad connected");
            } else {
                warn!(target: "bot", "gamepad disconnected");
            }
            self.gamepad_connected = connected;
        }

        let mut state = lock(&self.gamepad_state);
        if connected {
            let previous = state.clone();
            gamepad.read(&mut state);
            for axis in state.changed_axes(&previous) {
                trace!(target: "bot", "axis {} = {:.3}", axis, state.axes[axis]);
            }
        } else {
            state.reset();
        }
        connected
    }

    /// Leave the current mode: `<mode>_exit` then `cleanup`, then GC.
    ///
    /// Exit hooks are skipped when the activation already failed.
    pub fn exit(&mut self, loader: &dyn ScriptLoaderPort) -> Result<(), ScriptError> {
        info!(target: "bot", "leaving {} mode", self.mode);
        let mut result = Ok(());

        if let (Some(program), None) = (self.program.as_mut(), self.latched.as_ref()) {
            let hooks = self
                .mode
                .exit_hook()
                .into_iter()
                .chain(std::iter::once(LifecycleHook::Cleanup));
            for hook in hooks {
                if let Err(err) = program.invoke(hook) {
                    error!(target: "lua", "{}.{} failed: {}", program.name(), hook, err.message);
                    result = Err(err);
                    break;
                }
            }
        }

        lock(&self.drive).stop();
        lock(&self.shooter).stop();
        self.program = None;
        self.mode = BotMode::Disconnected;
        loader.collect_garbage();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::config_bridge::ConfigValue;
    use luabot_domain::ShooterMotors;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    // ==================== Mocks ====================

    struct NullMotors;

    impl ShooterMotors for NullMotors {
        fn set_primary(&mut self, _volts: f64) {}
        fn set_secondary(&mut self, _volts: f64) {}
    }

    #[derive(Default)]
    struct RecordingDrive {
        stops: usize,
    }

    impl DriveTrainPort for RecordingDrive {
        fn drive(&mut self, speed: f64, rotation: f64) {
            if speed == 0.0 && rotation == 0.0 {
                self.stops += 1;
            }
        }
    }

    struct FakeGamepad {
        connected: bool,
    }

    impl GamepadPort for FakeGamepad {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn read(&mut self, state: &mut GamepadState) {
            state.axes[1] = 0.5;
        }
    }

    struct NoConfig;

    impl ConfigBridgePort for NoConfig {
        fn get(&self, _category: &str, _symbol: &str) -> Option<ConfigValue> {
            None
        }
        fn port(&self, _symbol: &str) -> i32 {
            -1
        }
        fn num_ports(&self) -> i32 {
            0
        }
        fn trajectory_names(&self) -> Vec<String> {
            Vec::new()
        }
    }

    /// Scripted module: records calls, fails the hooks in `failing`.
    struct FakeModule {
        hooks: HashSet<LifecycleHook>,
        failing: Rc<RefCell<HashSet<LifecycleHook>>>,
        calls: Rc<RefCell<Vec<LifecycleHook>>>,
        error: String,
        load_error: Option<ScriptErrorKind>,
    }

    impl ScriptModulePort for FakeModule {
        fn name(&self) -> &str {
            "fake.bot"
        }

        fn error(&self) -> &str {
            &self.error
        }

        fn error_kind(&self) -> Option<ScriptErrorKind> {
            if self.error.is_empty() {
                None
            } else {
                Some(self.load_error.unwrap_or(ScriptErrorKind::Runtime))
            }
        }

        fn has_hook(&self, hook: LifecycleHook) -> bool {
            self.hooks.contains(&hook)
        }

        fn invoke(&mut self, hook: LifecycleHook) -> Result<InvokeOutcome, ScriptError> {
            if self.load_error.is_some() {
                return Ok(InvokeOutcome::Skipped);
            }
            self.error.clear();
            if !self.hooks.contains(&hook) {
                return Ok(InvokeOutcome::Skipped);
            }
            self.calls.borrow_mut().push(hook);
            if self.failing.borrow().contains(&hook) {
                self.error = format!("{} exploded", hook);
                return Err(ScriptError::new(ScriptErrorKind::Runtime, self.error.clone()));
            }
            Ok(InvokeOutcome::Completed)
        }
    }

    struct FakeLoader {
        hooks: Vec<LifecycleHook>,
        failing: Rc<RefCell<HashSet<LifecycleHook>>>,
        calls: Rc<RefCell<Vec<LifecycleHook>>>,
        load_error: Option<ScriptErrorKind>,
        collections: RefCell<usize>,
    }

    impl FakeLoader {
        fn new(hooks: &[LifecycleHook]) -> Self {
            Self {
                hooks: hooks.to_vec(),
                failing: Rc::default(),
                calls: Rc::default(),
                load_error: None,
                collections: RefCell::new(0),
            }
        }

        fn fail(&self, hook: LifecycleHook) {
            self.failing.borrow_mut().insert(hook);
        }

        fn recover(&self, hook: LifecycleHook) {
            self.failing.borrow_mut().remove(&hook);
        }

        fn calls(&self) -> Vec<LifecycleHook> {
            self.calls.borrow().clone()
        }
    }

    impl ScriptLoaderPort for FakeLoader {
        fn load_program(&self, _program: &str) -> Box<dyn ScriptModulePort> {
            Box::new(FakeModule {
                hooks: self.hooks.iter().copied().collect(),
                failing: Rc::clone(&self.failing),
                calls: Rc::clone(&self.calls),
                error: match self.load_error {
                    Some(_) => "file does not exist: fake.bot".to_string(),
                    None => String::new(),
                },
                load_error: self.load_error,
            })
        }

        fn list_programs(&self) -> Vec<String> {
            vec!["fake.bot".to_string()]
        }

        fn collect_garbage(&self) {
            *self.collections.borrow_mut() += 1;
        }
    }

    struct Rig {
        controller: ModeController,
        drive: Arc<Mutex<RecordingDrive>>,
        gamepad: Arc<Mutex<FakeGamepad>>,
        state: Arc<Mutex<GamepadState>>,
    }

    fn rig() -> Rig {
        let shooter = Arc::new(Mutex::new(Shooter::new(
            ShooterSettings::default(),
            Box::new(NullMotors),
        )));
        let drive = Arc::new(Mutex::new(RecordingDrive::default()));
        let gamepad = Arc::new(Mutex::new(FakeGamepad { connected: true }));
        let state = Arc::new(Mutex::new(GamepadState::default()));
        let controller = ModeController::new(
            shooter,
            drive.clone(),
            gamepad.clone(),
            state.clone(),
            20,
        );
        Rig {
            controller,
            drive,
            gamepad,
            state,
        }
    }

    fn stops(rig: &Rig) -> usize {
        rig.drive.lock().unwrap().stops
    }

    use LifecycleHook::*;

    // ==================== Tests ====================

    #[test]
    fn test_enter_calls_phase_hooks_in_order() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[Init, Prepare, TeleopInit, Teleop]);
        rig.controller
            .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig)
            .unwrap();
        assert_eq!(loader.calls(), vec![Init, Prepare, TeleopInit]);
        assert_eq!(rig.controller.program_name(), Some("fake.bot"));
        assert_eq!(*loader.collections.borrow(), 1);
    }

    #[test]
    fn test_periodic_prefers_mode_hook_then_run() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[Teleop, Run]);
        rig.controller
            .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig)
            .unwrap();
        assert_eq!(rig.controller.periodic(), TickOutcome::Scripted);
        assert_eq!(loader.calls(), vec![Teleop]);

        let mut rig = self::rig();
        let loader = FakeLoader::new(&[Run]);
        rig.controller
            .enter(BotMode::Autonomous, Some("fake.bot"), &loader, &NoConfig)
            .unwrap();
        rig.controller.periodic();
        assert_eq!(loader.calls(), vec![Run]);
    }

    #[test]
    fn test_load_error_latches_all_stop() {
        let mut rig = rig();
        let mut loader = FakeLoader::new(&[Init, Teleop]);
        loader.load_error = Some(ScriptErrorKind::FileNotFound);
        let err = rig
            .controller
            .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig)
            .unwrap_err();
        assert_eq!(err.kind, ScriptErrorKind::FileNotFound);

        for _ in 0..3 {
            assert_eq!(rig.controller.periodic(), TickOutcome::AllStop);
        }
        assert!(loader.calls().is_empty());
        assert_eq!(stops(&rig), 3);
        assert_eq!(rig.controller.all_stop_ticks(), 3);
    }

    #[test]
    fn test_failed_init_latches_and_skips_remaining_hooks() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[Init, Prepare, Teleop]);
        loader.fail(Init);
        assert!(
            rig.controller
                .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig)
                .is_err()
        );
        assert_eq!(rig.controller.periodic(), TickOutcome::AllStop);
        assert_eq!(loader.calls(), vec![Init]);
        assert_eq!(rig.controller.script_error(), Some("init exploded"));
    }

    #[test]
    fn test_fire_and_forget_error_latches_until_reentered() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[Teleop]);
        rig.controller
            .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig)
            .unwrap();
        assert_eq!(rig.controller.periodic(), TickOutcome::Scripted);

        // fails once, then would succeed
        loader.fail(Teleop);
        assert_eq!(rig.controller.periodic(), TickOutcome::AllStop);
        loader.recover(Teleop);
        for _ in 0..3 {
            assert_eq!(rig.controller.periodic(), TickOutcome::AllStop);
        }
        assert_eq!(loader.calls(), vec![Teleop, Teleop]);
        assert_eq!(rig.controller.script_error(), Some("teleop exploded"));
        assert_eq!(
            rig.controller.latched_error().map(|e| e.kind),
            Some(ScriptErrorKind::Runtime)
        );
        assert_eq!(stops(&rig), 4);

        // a fresh activation clears the latch
        rig.controller
            .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig)
            .unwrap();
        assert_eq!(rig.controller.periodic(), TickOutcome::Scripted);
        assert!(rig.controller.latched_error().is_none());
    }

    #[test]
    fn test_test_mode_step_failure_latches() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[Test]);
        rig.controller
            .enter(BotMode::Test, Some("fake.bot"), &loader, &NoConfig)
            .unwrap();

        loader.fail(Test);
        assert_eq!(rig.controller.periodic(), TickOutcome::AllStop);
        loader.recover(Test);
        assert_eq!(rig.controller.periodic(), TickOutcome::AllStop);
        assert_eq!(loader.calls(), vec![Test]);
        assert!(rig.controller.latched_error().is_some());
    }

    #[test]
    fn test_disconnected_gamepad_forces_all_stop() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[Teleop]);
        rig.controller
            .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig)
            .unwrap();

        assert_eq!(rig.controller.periodic(), TickOutcome::Scripted);
        assert_eq!(rig.state.lock().unwrap().axes[1], 0.5);

        rig.gamepad.lock().unwrap().connected = false;
        assert_eq!(rig.controller.periodic(), TickOutcome::AllStop);
        assert_eq!(rig.state.lock().unwrap().axes[1], 0.0);
        assert_eq!(loader.calls(), vec![Teleop]);
    }

    #[test]
    fn test_disabled_mode_drives_all_stop() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[]);
        rig.controller
            .enter(BotMode::Disabled, None, &loader, &NoConfig)
            .unwrap();
        assert_eq!(rig.controller.periodic(), TickOutcome::AllStop);
        assert_eq!(rig.controller.ticks(), 1);
    }

    #[test]
    fn test_exit_runs_exit_hooks() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[TeleopExit, Cleanup]);
        rig.controller
            .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig)
            .unwrap();
        rig.controller.exit(&loader).unwrap();
        assert_eq!(loader.calls(), vec![TeleopExit, Cleanup]);
        assert_eq!(rig.controller.mode(), BotMode::Disconnected);
        assert!(rig.controller.program_name().is_none());
    }

    #[test]
    fn test_exit_skips_hooks_after_latched_failure() {
        let mut rig = rig();
        let loader = FakeLoader::new(&[Init, Cleanup]);
        loader.fail(Init);
        let _ = rig
            .controller
            .enter(BotMode::Teleop, Some("fake.bot"), &loader, &NoConfig);
        rig.controller.exit(&loader).unwrap();
        assert_eq!(loader.calls(), vec![Init]);
    }
}
