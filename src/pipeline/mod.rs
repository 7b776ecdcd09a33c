//! Bulk validation pipeline.
//!
//! This module provides:
//! - [`ValidationPipeline`] - worker pool over a lazy address stream
//! - Category sinks with bounded, blocking channels
//! - Live progress counters
//! - [`OutputGuard`] - removal of partial output after an abandoned run

mod cleanup;
mod outcome;
mod progress;
mod sinks;
mod validator;

// Re-export public API
pub use cleanup::OutputGuard;
pub use outcome::{Category, RejectReason, ValidationOutcome};
pub use progress::{ProgressCounters, ProgressSnapshot};
pub use sinks::{CategorySinks, FileSink, MemorySink, OutcomeSink};
pub use validator::{OutcomeObserver, PipelineSettings, RunSummary, ValidationPipeline};
