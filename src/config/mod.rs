//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, retry policy, capacities, file names)
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{default_workers, Config, LogFormat, LogLevel};
