//! `bot.shooter`: the shooter sequencer.

use luabot_domain::{SHOOTER_MODULE, Shooter};
use mlua::prelude::*;
use std::sync::{Arc, Mutex};

use super::lock;
use crate::scripting::{CapabilitySet, NativeBinding};

pub const SHOOTER_SYMBOLS: &[&str] = &[
    "load",
    "intake",
    "shoot",
    "stop",
    "is_idle",
    "is_loading",
    "is_shooting",
];

/// Publishes the shooter commands and state queries.
pub struct ShooterBinding {
    shooter: Arc<Mutex<Shooter>>,
}

impl ShooterBinding {
    pub fn new(shooter: Arc<Mutex<Shooter>>) -> Self {
        Self { shooter }
    }
}

impl NativeBinding for ShooterBinding {
    fn module(&self) -> &'static str {
        SHOOTER_MODULE
    }

    fn symbols(&self) -> &'static [&'static str] {
        SHOOTER_SYMBOLS
    }

    fn capabilities(&self) -> CapabilitySet {
        let command = |f: fn(&mut Shooter)| {
            let shooter = Arc::clone(&self.shooter);
            move || -> LuaResult<()> {
                f(&mut *lock(&shooter, "shooter")?);
                Ok(())
            }
        };
        let query = |f: fn(&Shooter) -> bool| {
            let shooter = Arc::clone(&self.shooter);
            move || -> LuaResult<bool> { Ok(f(&*lock(&shooter, "shooter")?)) }
        };

        CapabilitySet::new()
            .action("load", command(Shooter::load))
            .action("intake", command(Shooter::intake))
            .action("shoot", command(Shooter::shoot))
            .action("stop", command(Shooter::stop))
            .boolean("is_idle", query(Shooter::is_idle))
            .boolean("is_loading", query(Shooter::is_loading))
            .boolean("is_shooting", query(Shooter::is_shooting))
    }
}
