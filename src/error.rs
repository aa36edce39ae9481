//! Crate-level error type and `Result` alias.
use thiserror::Error;

use crate::applications::ApplicationListError;
use crate::config::ConfigError;
use crate::report::ReportError;
use crate::telemetry::TelemetryError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("application list error: {0}")]
    ApplicationList(#[from] ApplicationListError),

    #[error("report error: {0}")]
    Report(#[from] ReportError),

    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
