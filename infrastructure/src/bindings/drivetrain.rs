//! `bot.drivetrain`: normalized arcade drive.

use luabot_application::DriveTrainPort;
use luabot_domain::{DRIVETRAIN_MODULE, NeutralReturn};
use mlua::prelude::*;
use std::sync::{Arc, Mutex};

use super::lock;
use crate::scripting::{CapabilitySet, NativeBinding};

pub const DRIVETRAIN_SYMBOLS: &[&str] = &["drive", "stop"];

/// Clamp a script-supplied input into `-1.0..=1.0`. NaN reads as 0.
fn normalized(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

pub struct DrivetrainBinding {
    drive: Arc<Mutex<dyn DriveTrainPort>>,
}

impl DrivetrainBinding {
    pub fn new(drive: Arc<Mutex<dyn DriveTrainPort>>) -> Self {
        Self { drive }
    }
}

impl NativeBinding for DrivetrainBinding {
    fn module(&self) -> &'static str {
        DRIVETRAIN_MODULE
    }

    fn symbols(&self) -> &'static [&'static str] {
        DRIVETRAIN_SYMBOLS
    }

    fn capabilities(&self) -> CapabilitySet {
        let drive = Arc::clone(&self.drive);
        let stop = Arc::clone(&self.drive);
        CapabilitySet::new()
            .function(
                "drive",
                NeutralReturn::Nothing,
                move |_, (speed, rotation): (f64, Option<f64>)| {
                    lock(&*drive, "drivetrain")?
                        .drive(normalized(speed), normalized(rotation.unwrap_or(0.0)));
                    Ok(())
                },
            )
            .action("stop", move || -> LuaResult<()> {
                lock(&*stop, "drivetrain")?.stop();
                Ok(())
            })
    }
}
