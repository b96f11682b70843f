use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "zenith.log";
const DEFAULT_DIRECTIVES: &str = "zenith_api=info,zenith=info,tower_http=info";

/// `RUST_LOG` when set and valid, otherwise the crate defaults
fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber: readable lines on stdout plus JSON records
/// in `logs/zenith.log`, rotated daily.
pub fn init_logging() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("cannot create {LOG_DIR}/: {e}; file logging may fail");
    }

    let (file_writer, guard): (_, WorkerGuard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, LOG_FILE));

    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(fmt::layer().json().with_writer(file_writer))
        .init();

    // Dropping the guard stops the background writer
    std::mem::forget(guard);
}
