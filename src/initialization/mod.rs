//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources of a run:
//! - Logger (plain or JSON)
//! - HTTP client used to download the disposable-domain list
//! - DNS resolver used for MX lookups
//!
//! All initialization functions return [`InitializationError`](crate::error_handling::InitializationError).

mod client;
mod logger;
mod resolver;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver;
