//! Process-wide logging on top of `env_logger`.
//!
//! Two line formats are available: a colored one for terminals and one JSON
//! object per line for log shippers.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Record};
use serde_json::{json, Value};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Most verbose level each chatty dependency may log at.
const DEPENDENCY_CEILINGS: &[(&str, LevelFilter)] = &[
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    // every truncated UDP answer is a warning here
    ("hickory_proto", LevelFilter::Error),
    ("hickory_resolver", LevelFilter::Warn),
];

/// Installs the global logger.
///
/// Directives from `RUST_LOG` are applied first and `level` is layered on
/// top, so `RUST_LOG=hickory_resolver=debug` can still widen a single
/// dependency. Dependencies never log above `level`.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug email_sieve addresses.txt
/// email_sieve addresses.txt --log-level debug --log-format json
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for &(module, ceiling) in DEPENDENCY_CEILINGS {
        builder.filter_module(module, ceiling.min(level));
    }
    builder.filter_module(env!("CARGO_CRATE_NAME"), level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| writeln!(buf, "{}", json_line(record, Utc::now())));
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let clock = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
                writeln!(buf, "{}", plain_line(record, &clock))
            });
        }
    }

    builder.try_init()?;
    Ok(())
}

fn json_line(record: &Record<'_>, at: DateTime<Utc>) -> Value {
    json!({
        "ts": at.to_rfc3339_opts(SecondsFormat::Millis, true),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
}

fn plain_line(record: &Record<'_>, clock: &str) -> String {
    let level = record.level();
    format!(
        "{} {} {} [{}] {}",
        clock.dimmed(),
        level_marker(level),
        record.target().cyan(),
        level_label(level),
        record.args()
    )
}

fn level_marker(level: Level) -> &'static str {
    match level {
        Level::Error => "❌",
        Level::Warn => "⚠️",
        Level::Info => "✔️",
        Level::Debug => "🔍",
        Level::Trace => "🔬",
    }
}

fn level_label(level: Level) -> ColoredString {
    let name = level.as_str();
    match level {
        Level::Error => name.red().bold(),
        Level::Warn => name.yellow(),
        Level::Info => name.green(),
        Level::Debug => name.blue(),
        Level::Trace => name.purple(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_json_line_escapes_message() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap();
        let line = json_line(
            &Record::builder()
                .args(format_args!("bad token \"x@@y\"\nnext"))
                .level(Level::Warn)
                .target("email_sieve::pipeline")
                .build(),
            at,
        );

        assert_eq!(line["ts"], "2026-03-01T12:30:05.000Z");
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["target"], "email_sieve::pipeline");
        assert_eq!(line["msg"], "bad token \"x@@y\"\nnext");
        assert!(!line.to_string().contains('\n'));
    }

    #[test]
    fn test_plain_line_layout() {
        let line = plain_line(
            &Record::builder()
                .args(format_args!("Loaded 12 disposable domains"))
                .level(Level::Info)
                .target("email_sieve::run")
                .build(),
            "09:15:00.250",
        );

        assert!(line.contains("09:15:00.250"));
        assert!(line.contains("✔️"));
        assert!(line.contains("email_sieve::run"));
        assert!(line.contains("INFO"));
        assert!(line.ends_with("Loaded 12 disposable domains"));
    }

    #[test]
    fn test_every_level_has_a_distinct_marker() {
        let markers: std::collections::HashSet<_> = [
            Level::Error,
            Level::Warn,
            Level::Info,
            Level::Debug,
            Level::Trace,
        ]
        .into_iter()
        .map(level_marker)
        .collect();
        assert_eq!(markers.len(), 5);
    }

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let first = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let second = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(first.is_ok() || matches!(first, Err(InitializationError::LoggerError(_))));
        assert!(matches!(second, Err(InitializationError::LoggerError(_))));
    }
}
