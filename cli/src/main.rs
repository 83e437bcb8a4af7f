//! CLI entrypoint for luabot
//!
//! Wires the layers together: host config, the script engine, simulated
//! subsystems and the mode controller, then runs one mode activation.

use anyhow::{Context, Result, bail};
use clap::Parser;
use luabot_application::{
    ConfigBridgePort, DriveTrainPort, GamepadPort, ModeController, ScriptLoaderPort,
};
use luabot_domain::{BotMode, GamepadState, Shooter};
use luabot_infrastructure::{
    DrivetrainBinding, GamepadBinding, HostConfigLoader, ScriptEngine, ShooterBinding,
    SimDrivetrain, SimGamepad, SimShooterMotors,
};
use luabot_presentation::{BannerInfo, Cli, ConsoleFormatter, RunSummary};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        let sources = HostConfigLoader::config_sources(cli.config.as_deref());
        println!("{}", ConsoleFormatter::config_sources(&sources));
        return Ok(());
    }

    // Held until exit so buffered file logs are flushed
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting luabot");

    let config = HostConfigLoader::load(cli.config.as_deref())?;

    // === Script engine ===
    let mut engine = ScriptEngine::new()?;
    if let Some(dir) = cli.scripts.as_ref().or(config.scripts.search_path.as_ref()) {
        engine.set_search_path(dir)?;
    }
    if !engine.bootstrap(&config.scripts.candidates(), &config.scripts.marker) {
        warn!("continuing without robot configuration");
    }

    if cli.list_programs {
        let programs = engine.list_programs();
        println!(
            "{}",
            ConsoleFormatter::program_list(engine.search_directory(), &programs)
        );
        return Ok(());
    }

    let period_ms = cli
        .period
        .or(config.control.period_ms)
        .unwrap_or_else(|| engine.config().engine_period_ms());
    if period_ms <= 0 {
        bail!("control period must be positive, got {} ms", period_ms);
    }
    let ticks = cli.ticks.unwrap_or(config.control.ticks);

    // === Subsystems ===
    let motors = SimShooterMotors::new();
    let shooter_volts = motors.output();
    let shooter = Arc::new(Mutex::new(Shooter::new(
        engine.config().shooter_settings(),
        Box::new(motors),
    )));
    let drive = Arc::new(Mutex::new(SimDrivetrain::default()));
    let drive_port: Arc<Mutex<dyn DriveTrainPort>> = drive.clone();
    let gamepad: Arc<Mutex<dyn GamepadPort>> = Arc::new(Mutex::new(SimGamepad::default()));
    let gamepad_state = Arc::new(Mutex::new(GamepadState::default()));

    let shooter_binding = ShooterBinding::new(Arc::clone(&shooter));
    let drivetrain_binding = DrivetrainBinding::new(Arc::clone(&drive_port));
    let gamepad_binding = GamepadBinding::new(Arc::clone(&gamepad_state));
    engine.bind(&shooter_binding)?;
    engine.bind(&drivetrain_binding)?;
    engine.bind(&gamepad_binding)?;

    let banner = {
        let robot = engine.config();
        BannerInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            lua_version: engine.version(),
            team_name: robot.team_name(),
            team_number: robot.team_number(),
            search_dir: engine.search_directory().map(Path::to_path_buf),
            period_ms,
        }
    };
    println!("{}", ConsoleFormatter::banner(&banner));

    // === Mode activation ===
    let mode = BotMode::from(cli.mode);
    let program = cli
        .program
        .clone()
        .or_else(|| config.programs.program_for(mode).map(String::from));

    let mut controller = ModeController::new(
        Arc::clone(&shooter),
        drive_port,
        gamepad,
        gamepad_state,
        period_ms,
    );
    if let Err(e) = controller.enter(mode, program.as_deref(), &engine, &engine.config()) {
        warn!("{} mode entered with a failed program: {}", mode, e);
    }

    let mut interval = tokio::time::interval(Duration::from_millis(period_ms as u64));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    for _ in 0..ticks {
        tokio::select! {
            _ = &mut shutdown => {
                warn!("interrupted after {} ticks", controller.ticks());
                break;
            }
            _ = next_tick(&mut interval, cli.fast) => {}
        }
        controller.periodic();
    }

    let ran = controller.ticks();
    let all_stop_ticks = controller.all_stop_ticks();
    let mut error = controller.script_error().map(String::from);
    if let Err(e) = controller.exit(&engine) {
        if error.is_none() {
            error = Some(e.message);
        }
    }

    let summary = RunSummary {
        mode,
        program,
        ticks: ran,
        all_stop_ticks,
        error,
        shooter: shooter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state_label()
            .to_string(),
        drive: drive.lock().unwrap_or_else(PoisonError::into_inner).last(),
        shooter_volts: {
            let volts = shooter_volts.lock().unwrap_or_else(PoisonError::into_inner);
            (volts.primary, volts.secondary)
        },
    };
    println!("{}", ConsoleFormatter::summary(&summary));

    // Retract everything scripts can reach before the subsystems go away
    engine.unbind(&gamepad_binding)?;
    engine.unbind(&drivetrain_binding)?;
    engine.unbind(&shooter_binding)?;
    drop(controller);
    engine.shutdown();

    info!("luabot finished");
    Ok(())
}

async fn next_tick(interval: &mut Interval, fast: bool) {
    if fast {
        tokio::task::yield_now().await;
    } else {
        interval.tick().await;
    }
}

/// Initialize logging based on verbosity level, optionally teeing into a
/// log file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let name = path
                .file_name()
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer)
        .init();

    Ok(guard)
}
