//! Tracing subscriber setup.
//!
//! Structured logging for the pipeline via the `tracing` and
//! `tracing-subscriber` crates. The configured level acts as a default; the
//! standard `RUST_LOG` environment variable still takes precedence, so a
//! one-off `RUST_LOG=logicreel=trace` works without touching the config
//! file.

use tracing_subscriber::EnvFilter;

use crate::error::{AppResult, ReelError};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Pretty-printed format with colors (for interactive use)
    #[default]
    Pretty,
    /// Compact format without colors (for redirected output)
    Compact,
}

/// Install the global tracing subscriber.
///
/// `level` is the default directive when `RUST_LOG` is unset; it has already
/// been validated by [`crate::config::Settings::validate`].
pub fn init(level: &str, format: OutputFormat) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ReelError::Configuration(format!("Invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        OutputFormat::Pretty => builder.try_init(),
        OutputFormat::Compact => builder.with_ansi(false).compact().try_init(),
    }
    .map_err(|e| ReelError::Configuration(format!("Failed to install tracing subscriber: {e}")))
}
