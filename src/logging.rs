use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{prelude::*, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LogRotation, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber: stdout plus an optional rolling file.
///
/// Level comes from `logging.level` if set, else `RUST_LOG`, else `info`.
/// The returned guard flushes the file writer on drop; hold it for the life
/// of the process. Calling this twice keeps the first subscriber.
pub fn init_with_config(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let mut layers: Vec<BoxedLayer> = vec![build_filter(cfg).boxed(), stdout_layer(cfg.format)];

    let guard = if cfg.enable_file_logging {
        open_log_file(cfg).map(|(writer, guard)| {
            layers.push(file_layer(cfg.format, writer));
            guard
        })
    } else {
        None
    };

    let _ = tracing_subscriber::registry().with(layers).try_init();
    guard
}

fn build_filter(cfg: &LoggingConfig) -> EnvFilter {
    match cfg.level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn stdout_layer(format: LogFormat) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(std::io::stdout);
    match format {
        LogFormat::Json => layer.json().with_ansi(false).boxed(),
        LogFormat::Text => layer.with_ansi(true).boxed(),
    }
}

fn file_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(writer);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Text => layer.boxed(),
    }
}

fn open_log_file(cfg: &LoggingConfig) -> Option<(NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(&cfg.dir) {
        eprintln!(
            "Failed to create log directory '{}': {err}; continuing with stdout logs",
            cfg.dir
        );
        return None;
    }

    let rotation = match cfg.rotation {
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Never => Rotation::NEVER,
    };
    let appender = RollingFileAppender::new(rotation, &cfg.dir, &cfg.filename);
    Some(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_config_level_wins_over_env() {
        let cfg = LoggingConfig {
            level: Some(LogLevel::Warn),
            ..LoggingConfig::default()
        };
        assert_eq!(build_filter(&cfg).to_string(), "warn");
    }

    #[test]
    fn test_file_logging_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");
        let cfg = LoggingConfig {
            dir: log_dir.to_string_lossy().into_owned(),
            enable_file_logging: true,
            rotation: LogRotation::Never,
            ..LoggingConfig::default()
        };

        let opened = open_log_file(&cfg);
        assert!(opened.is_some());
        assert!(log_dir.is_dir());
    }
}
