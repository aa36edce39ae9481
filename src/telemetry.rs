//! Run-scoped logging.
//!
//! Nothing here installs a global subscriber. Each run builds a [`Dispatch`]
//! and hands it to whoever needs to log; worker threads enter it with
//! [`tracing::dispatcher::with_default`]. Dropping the last clone closes the
//! log file.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use thiserror::Error;
use tracing::Dispatch;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter { value: String, source: ParseError },

    #[error("unable to create log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Local wall-clock time with milliseconds, e.g. `2024-03-01 14:05:09,312`.
struct LogTimestamp;

impl FormatTime for LogTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S,%3f"))
    }
}

/// Builds a dispatcher that logs to stdout and, when `log_file` is given, to
/// that file (created fresh). `RUST_LOG` wins over `log_level` when set.
pub fn dispatch(log_level: &str, log_file: Option<&Path>) -> Result<Dispatch, TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|source| TelemetryError::EnvFilter {
            value: log_level.to_string(),
            source,
        })?,
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| TelemetryError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_timer(LogTimestamp)
                    .with_target(false)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer);

    Ok(Dispatch::new(subscriber))
}
