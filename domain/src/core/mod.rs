//! Core domain concepts shared across all subdomains.
//!
//! - [`mode::BotMode`]: the operating mode selected by the field
//! - [`ticker::MessageTicker`]: throttled status messages for the loop
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod mode;
pub mod ticker;
