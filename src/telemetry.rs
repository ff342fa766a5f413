//! Telemetry and tracing utilities
//!
//! This module provides utilities for initializing a tracing subscriber for
//! hosts that embed the chat core.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chatwire::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let _guard = init_subscriber(SubscriberConfig::default())?;
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::ChatError;

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Default level when `RUST_LOG` is not set
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Log file path (optional). Console output is used when absent.
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// Debug-level text output on the console.
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self, ChatError> {
        let level = match level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => {
                return Err(ChatError::ConfigurationError(format!(
                    "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
                )));
            }
        };
        self.log_level = Some(level);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn build(self) -> SubscriberConfig {
        let defaults = SubscriberConfig::default();
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(defaults.log_level),
            output_format: self.output_format.unwrap_or(defaults.output_format),
            log_file: self.log_file,
        }
    }
}

fn env_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Install the global subscriber.
///
/// Returns the appender guard when logging to a file; keep it alive for the
/// lifetime of the program or buffered lines are lost.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>, ChatError> {
    let filter = env_filter(config.log_level);

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path.file_name().ok_or_else(|| {
                ChatError::ConfigurationError(format!(
                    "Log file path has no file name: {}",
                    path.display()
                ))
            })?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match (config.output_format, writer) {
        (OutputFormat::Text, None) => registry.with(fmt::layer()).try_init(),
        (OutputFormat::Json, None) => registry.with(fmt::layer().json()).try_init(),
        (OutputFormat::Text, Some(w)) => registry
            .with(fmt::layer().with_ansi(false).with_writer(w))
            .try_init(),
        (OutputFormat::Json, Some(w)) => registry
            .with(fmt::layer().json().with_writer(w))
            .try_init(),
    };

    result.map_err(|e| ChatError::ConfigurationError(format!("Failed to install subscriber: {e}")))?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_parses_levels() {
        let config = SubscriberConfig::builder()
            .log_level_str("WARN")
            .unwrap()
            .output_format(OutputFormat::Json)
            .build();
        assert_eq!(config.log_level, tracing::Level::WARN);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn builder_rejects_unknown_level() {
        assert!(SubscriberConfig::builder().log_level_str("loud").is_err());
    }

    #[test]
    fn file_output_returns_guard() {
        let dir = tempfile::tempdir().unwrap();
        let config = SubscriberConfig::builder()
            .log_file(dir.path().join("chatwire.log"))
            .build();
        // Another test binary may already own the global subscriber.
        match init_subscriber(config) {
            Ok(guard) => assert!(guard.is_some()),
            Err(e) => assert!(matches!(e, ChatError::ConfigurationError(_))),
        }
    }
}
