//! Test logging configuration
//!
//! Session tests run several peers inside one process, so their logs
//! interleave. Set `CODEWORD_TEST_LOG=debug` (or any `EnvFilter` directive)
//! to see them; otherwise only errors reach the test writer.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Environment variable that overrides the test log filter
pub const TEST_LOG_ENV: &str = "CODEWORD_TEST_LOG";

/// Install the test subscriber once per test binary.
///
/// `level` is used unless `CODEWORD_TEST_LOG` is set. Later calls are
/// ignored, whatever level they ask for.
///
/// ```rust
/// use cw_test_helpers::logging::init_test_logging;
///
/// init_test_logging("cw_sync=debug");
/// tracing::debug!("visible with --nocapture");
/// ```
pub fn init_test_logging(level: &str) {
    INIT.call_once(|| {
        let filter = std::env::var(TEST_LOG_ENV)
            .ok()
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new(level));

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Errors only
pub fn suppress_logs() {
    init_test_logging("error");
}
