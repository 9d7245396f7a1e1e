//! Structured logging setup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber.
#[derive(Error, Debug)]
pub enum ObservabilityError {
    /// Unknown level name.
    #[error("Unknown log level: {0}")]
    InvalidLevel(String),

    /// Unknown format name.
    #[error("Unknown log format: {0}")]
    InvalidFormat(String),

    /// The filter directive did not parse.
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// A global subscriber is already installed.
    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

/// Minimum level to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ObservabilityError::InvalidLevel(other.to_string())),
        }
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (for production/log aggregation).
    Json,
    /// Human-readable format (for development).
    #[default]
    Human,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Human => "human",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "human" | "pretty" | "text" => Ok(Self::Human),
            other => Err(ObservabilityError::InvalidFormat(other.to_string())),
        }
    }
}

/// Stream log lines are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogWriter {
    #[default]
    Stdout,
    /// Keeps stdout free for command output.
    Stderr,
}

impl LogWriter {
    fn make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Default level for every target.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Extra filter directives, e.g. `"tower_http=debug"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directives: Option<String>,
    /// Chosen by the process, not the config file.
    #[serde(skip)]
    pub writer: LogWriter,
}

impl LogConfig {
    pub fn new(level: LogLevel, format: LogFormat) -> Self {
        Self {
            level,
            format,
            directives: None,
            writer: LogWriter::Stdout,
        }
    }

    pub fn with_writer(mut self, writer: LogWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Add filter directives after the default level.
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Filter directive string built from the config.
    pub fn filter_directive(&self) -> String {
        match self.directives.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("{},{}", self.level.as_str(), extra),
            _ => self.level.as_str().to_string(),
        }
    }

    /// Filter from the configured directive alone, ignoring `RUST_LOG`.
    pub fn configured_filter(&self) -> Result<EnvFilter, ObservabilityError> {
        EnvFilter::try_new(self.filter_directive())
            .map_err(|e| ObservabilityError::InvalidFilter(e.to_string()))
    }

    /// `RUST_LOG` when set and valid, otherwise the configured directive.
    pub fn env_filter(&self) -> Result<EnvFilter, ObservabilityError> {
        EnvFilter::try_from_default_env().or_else(|_| self.configured_filter())
    }
}

/// Install the global `tracing` subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), ObservabilityError> {
    let filter = config.env_filter()?;
    let result = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .with_writer(config.writer.make_writer())
            .try_init(),
        LogFormat::Human => tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(config.writer.make_writer())
            .try_init(),
    };
    result.map_err(|e| ObservabilityError::Init(e.to_string()))?;

    tracing::debug!(
        level = config.level.as_str(),
        format = config.format.as_str(),
        "logging initialised"
    );
    Ok(())
}
