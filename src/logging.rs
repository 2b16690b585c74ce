//! Logging initialization for forumbridge.
//!
//! Log output goes to stdout and, unless `logging.file` is empty, to an
//! append-only log file. `FORUMBRIDGE_LOG` overrides the configured level
//! with a full filter directive (e.g. `forumbridge::access=debug`).

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{BridgeError, Result};

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "FORUMBRIDGE_LOG";

fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}

/// Initialize logging from the configuration.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if config.file.is_empty() {
        return tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .with(filter_for(&config.level))
            .try_init()
            .map_err(|e| BridgeError::Config(format!("logging already initialized: {e}")));
    }

    let path = Path::new(&config.file);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(Arc::new(log_file)))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter_for(&config.level))
        .try_init()
        .map_err(|e| BridgeError::Config(format!("logging already initialized: {e}")))
}

/// Initialize console-only logging, ignoring an already installed
/// subscriber.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter_for(level))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" info "), Level::INFO);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("Error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_default() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_init_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/forumbridge.log");
        let config = LoggingConfig {
            level: "debug".to_string(),
            file: file.to_string_lossy().into_owned(),
        };

        // Another test may already own the global subscriber.
        let _ = init(&config);
        assert!(file.exists());
    }
}
