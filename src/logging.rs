//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events under the `devprompt::*`
//! targets; installing a subscriber is left to binaries and tests.
//!
//! ```rust,ignore
//! use devprompt::logging::{LoggingConfig, OutputFormat, init};
//!
//! init(&LoggingConfig::default().with_format(OutputFormat::Json))?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::error::EnhanceError;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "devprompt=info";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG` when set.
    pub filter: String,
    pub format: OutputFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: OutputFormat::Text,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Resolve the effective filter: `RUST_LOG` first, then `self.filter`.
    pub fn env_filter(&self) -> Result<EnvFilter, EnhanceError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter).map_err(|e| {
                EnhanceError::ConfigurationError(format!(
                    "invalid log filter `{}`: {e}",
                    self.filter
                ))
            }),
        }
    }
}

/// Install a global subscriber writing to stderr.
///
/// Calling this when a subscriber is already installed is not an error.
pub fn init(config: &LoggingConfig) -> Result<(), EnhanceError> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = match config.format {
        OutputFormat::Json => builder.json().try_init(),
        OutputFormat::Text => builder.try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(target: "devprompt::logging", err = %e, "subscriber already installed");
    }
    Ok(())
}
