//! Run-level helpers.
//!
//! This module provides progress logging, shutdown handling and the
//! statistics printed at the end of a run.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::{format_progress, log_progress};
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_error_statistics, print_summary};
