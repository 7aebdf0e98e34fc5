//! Logging setup: warnings to stderr, everything enabled by the filter to a
//! daily file under the storage `logs/` directory.

use fs_err as fs;
use std::env;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use viewer_core::StorageConfig;

const LOG_FILE_PREFIX: &str = "project-viewer.log";

fn filter() -> EnvFilter {
    let debug_enabled = env::var("PROJECT_VIEWER_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered file logs are flushed.
pub fn init(storage: &StorageConfig) -> Option<WorkerGuard> {
    let logs_dir = storage.logs_dir();
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        let _ = tracing_subscriber::registry()
            .with(filter())
            .with(stderr_layer)
            .try_init();
        tracing::warn!(error = %e, "File logging disabled");
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer().with_ansi(false).with_writer(writer);

    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    Some(guard)
}
