//! Logging setup
//!
//! `tracing-subscriber` registry with an `EnvFilter` and one `fmt` layer.
//! `RUST_LOG` wins over the configured level. Output goes to stderr or to
//! the configured file, never to stdout, which carries the rendered UI.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Output format of log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` selects JSON lines; anything else is human-readable
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Filter from `RUST_LOG`, else the configured level, else `warn`
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let (writer, ansi) = match &config.file {
        Some(path) => {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| LoggingError::Io {
                    path: path.clone(),
                    error: e.to_string(),
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| LoggingError::Io {
                    path: path.clone(),
                    error: e.to_string(),
                })?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let layer = match LogFormat::parse(&config.format) {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter(&config.level))
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Pretty);
    }

    #[test]
    fn test_unopenable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            // A directory cannot be opened for appending.
            file: Some(dir.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        assert!(matches!(init(&config), Err(LoggingError::Io { .. })));
    }
}
