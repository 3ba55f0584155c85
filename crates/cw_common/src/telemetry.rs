//! Telemetry and logging initialization
//!
//! Structured logging with `tracing` and `tracing-subscriber`. The terminal
//! client draws the board on stdout, so all logs go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug,tungstenite=info,tokio_tungstenite=info"
    } else {
        "info"
    }
}

/// Initialize tracing subscriber with appropriate configuration
///
/// # Arguments
/// * `verbose` - If true, sets log level to DEBUG, otherwise INFO
/// * `json_format` - If true, outputs logs in JSON format for machine parsing
///
/// Returns `false` if a global subscriber was already installed.
///
/// # Example
/// ```
/// cw_common::telemetry::init_tracing(false, false);
/// tracing::info!("Session starting");
/// ```
pub fn init_tracing(verbose: bool, json_format: bool) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    if json_format {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .with(env_filter)
            .try_init()
            .is_ok()
    }
}
