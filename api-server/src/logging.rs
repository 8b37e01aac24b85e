//! Logging setup - stdout always, rolling file when LOG_DIR is set

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{Config, LogFormat};

const DEFAULT_LOG_FILTER: &str = "churn_server=debug,churn_core=info,tower_http=debug";

pub const LOG_FILE_PREFIX: &str = "app";
pub const LOG_FILE_SUFFIX: &str = "log";
/// Rotated files kept on disk (current + backups)
pub const LOG_FILES_KEPT: usize = 4;

/// Keeps the file writer thread alive; drop only on shutdown
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Rolling appender under `dir` (created if missing)
pub fn file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create log dir {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(LOG_FILES_KEPT)
        .build(dir)
        .with_context(|| format!("failed to open log file in {}", dir.display()))
}

pub fn init_tracing(config: &Config) -> LogGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let stdout_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
    };

    let mut file_guard = None;
    let file_layer = match config.log_dir.as_deref().map(file_appender) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guard = Some(guard);
            let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
            Some(match config.log_format {
                LogFormat::Json => layer.json().boxed(),
                LogFormat::Text => layer.boxed(),
            })
        }
        Some(Err(e)) => {
            // subscriber not up yet
            eprintln!("File logging disabled: {:#}", e);
            None
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    LogGuard {
        _file_guard: file_guard,
    }
}
