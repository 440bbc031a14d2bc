use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::LoggingConfig;
use crate::error::Result;

const DEFAULT_FILTER: &str = "info";

pub struct FileLogger {
    log_directory: PathBuf,
    file_prefix: String,
}

impl FileLogger {
    pub fn new(log_directory: PathBuf, file_prefix: impl Into<String>) -> Self {
        Self {
            log_directory,
            file_prefix: file_prefix.into(),
        }
    }

    pub fn setup_file_logging(&self) -> Result<(NonBlocking, WorkerGuard)> {
        // Ensure log directory exists
        std::fs::create_dir_all(&self.log_directory)?;

        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            &self.log_directory,
            &self.file_prefix,
        );

        Ok(tracing_appender::non_blocking(file_appender))
    }
}

/// Installs the global subscriber: console output plus an optional rolling log file.
/// The returned guard must be kept alive for file logs to be flushed.
pub fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            let (writer, guard) =
                FileLogger::new(dir.clone(), config.file_prefix.clone()).setup_file_logging()?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false) // Disable ANSI colors for file logs
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer()) // Console output
        .with(file_layer)
        .init();

    Ok(guard)
}
