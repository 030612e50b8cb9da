//! Structured logging for the command-line driver.
//!
//! Installs a global `tracing` subscriber writing to stderr so reports on
//! stdout stay machine-readable. `RUST_LOG` sets the filter (default `info`);
//! `MIN_WEAKNESS_LOG_FORMAT=json` switches from human-readable lines to JSON.
//! Events from crates on the `log` facade are bridged in.

use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FORMAT_ENV: &str = "MIN_WEAKNESS_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("`MIN_WEAKNESS_LOG_FORMAT` is not valid UTF-8")]
    InvalidUnicode,
    #[error("unsupported log format `{0}`; expected `human` or `json`")]
    UnsupportedFormat(String),
    #[error("failed to install tracing subscriber: {0}")]
    InstallFailed(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnsupportedFormat(other.to_owned())),
        }
    }
}

fn format_from_env() -> Result<LogFormat, LoggingError> {
    match env::var(LOG_FORMAT_ENV) {
        Ok(raw) => raw.parse(),
        Err(env::VarError::NotPresent) => Ok(LogFormat::default()),
        Err(env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode),
    }
}

/// Installs the subscriber; call once, before any work is done.
pub fn init_logging() -> Result<(), LoggingError> {
    let format = format_from_env()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let fmt_layer = match format {
        LogFormat::Human => fmt_layer.boxed(),
        LogFormat::Json => fmt_layer.json().with_current_span(true).boxed(),
    };

    // another logger may already own the `log` slot; keep it if so
    let _ = LogTracer::init();

    tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()?;
    Ok(())
}
