//! Logging bootstrap.
//!
//! Installs a `tracing` subscriber writing to stderr so stdout stays clean for
//! JSON and report output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Options controlling the log subscriber.
#[derive(Debug, Clone, Default)]
pub struct LogOptions<'a> {
    /// Filter directive override (e.g. "debug", "isa_evidence=trace")
    pub level: Option<&'a str>,

    /// Disable ANSI colors
    pub no_color: bool,

    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
}

/// Initialize the tracing subscriber with stderr output.
///
/// The filter comes from `options.level`, falling back to `RUST_LOG`, then
/// `info`. Fails if the filter is invalid or a global subscriber is already
/// installed.
///
/// # Example
/// ```no_run
/// use isa_core::logging::{init_logging, LogOptions};
///
/// init_logging(&LogOptions::default()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(options: &LogOptions<'_>) -> AppResult<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = options.level.unwrap_or(&default_level);

    let env_filter = EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))?;

    let ansi = !options.no_color && supports_color();

    if options.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_ansi(ansi);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;
    }

    Ok(())
}

/// Color is on unless `NO_COLOR` is set.
fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}
