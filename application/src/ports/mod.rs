//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod config_bridge;
pub mod hardware;
pub mod scripting_engine;
