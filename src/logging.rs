//! Tracing subscriber setup: stderr plus a daily-rolling log file

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,rusqlite=warn";

const LOG_FILE_PREFIX: &str = "webex-update-notifier.log";

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` when set. The returned guard flushes the
/// file writer on drop and must be held for the lifetime of the process.
pub fn init(log_dir: &Path, json: bool) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (json_file_layer, text_file_layer) = if json {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false),
            ),
        )
    };

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_file_layer)
        .with(text_file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(guard)
}
