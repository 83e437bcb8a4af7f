//! Presentation layer for luabot
//!
//! This crate contains the CLI definition and console output formatting.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, ModeArg};
pub use output::console::{BannerInfo, ConsoleFormatter, RunSummary};
