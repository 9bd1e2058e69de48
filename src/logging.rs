// ============================================================================
// src/logging.rs – tracing subscriber setup
// ============================================================================
//! Diagnostics go to stderr so stdout stays clean for codes and JSON lines.
//!
//! - `MAILGATE_LOG` or `RUST_LOG`: filter directive (e.g. `mailgate=debug`)
//! - `MAILGATE_LOG_FORMAT`: `pretty`, `compact` (default) or `json`

use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
}

/// Filter used when no env var is set, by `-v` count.
fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "mailgate=warn,warn",
        1 => "mailgate=info,warn",
        2 => "mailgate=debug,info",
        _ => "trace",
    }
}

impl LogConfig {
    pub fn from_env(verbose: u8) -> Self {
        let filter = std::env::var("MAILGATE_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| verbosity_filter(verbose).to_string());
        let format = std::env::var("MAILGATE_LOG_FORMAT")
            .map(|s| LogFormat::parse(&s))
            .unwrap_or_default();
        Self { filter, format }
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(config: LogConfig) {
    let env_filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("mailgate=warn"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
            .try_init(),
    };
}
