use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "list_scraper.log";
const DEFAULT_FILTER: &str = "list_scraper=info,warn";

/// Install the global subscriber: JSON lines into a daily file under `logs/`
/// plus human-readable lines on stderr. Stdout is left to command reports.
///
/// Keep the returned guard alive for the whole process; dropping it flushes
/// and stops the file writer.
pub fn init_logging() -> WorkerGuard {
    init_logging_in(Path::new(LOG_DIR))
}

fn init_logging_in(dir: &Path) -> WorkerGuard {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("could not create log directory {}: {}", dir.display(), e);
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();

    guard
}
