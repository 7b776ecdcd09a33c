//! email_sieve library: bulk email address validation
//!
//! This library sorts email addresses into four categories: valid, invalid
//! format, disposable domain and missing MX records. Disposable domains come
//! from a cached community list merged with local custom lists; MX records
//! are looked up with bounded concurrency and retries, and every domain is
//! resolved at most once per run.
//!
//! # Example
//!
//! ```no_run
//! use email_sieve::{run_validation, CancellationToken, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: Some(std::path::PathBuf::from("addresses.txt")),
//!     workers: 8,
//!     ..Default::default()
//! };
//!
//! let report = run_validation(config, CancellationToken::new()).await?;
//! println!("{} valid, {} disposable, {} without MX",
//!          report.valid, report.disposable, report.missing_mx);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod cache;
pub mod config;
pub mod disposable;
pub mod email;
pub mod error_handling;
pub mod initialization;
pub mod input;
pub mod lists;
pub mod mx;
pub mod pipeline;
mod run;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::RunError;
pub use lists::{run_merge, MergeReport};
pub use run::{run_validation, run_validation_with, ValidationReport};
pub use tokio_util::sync::CancellationToken;
