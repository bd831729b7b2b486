//! Structured logging setup.
//!
//! Logs go to stderr so that CLI output on stdout stays machine-readable.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Line encoding selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// Logging settings carried on [`crate::Config`].
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directives from `LOG_LEVEL`
    pub level: String,
    /// Encoding from `LOG_FORMAT`
    pub format: LogFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl TracingConfig {
    /// Directives actually applied: a non-blank `RUST_LOG` replaces `LOG_LEVEL`.
    fn directives(&self, rust_log: Option<String>) -> String {
        rust_log
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.level.clone())
    }

    fn filter(&self) -> EnvFilter {
        let directives = self.directives(std::env::var(EnvFilter::DEFAULT_ENV).ok());
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Call once, before issuing or verifying.
pub fn init_tracing(config: &TracingConfig) {
    let filter = config.filter();

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    tracing::debug!(format = %config.format, "Logging initialized");
}
