//! Enhancer configuration.
//!
//! Built from defaults, environment variables, or `with_*` builder methods.
//! The API key is optional here: a missing key is reported by the executor
//! as a configuration error when a request is attempted.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::prompt::ModelSelection;
use crate::retry::RetryPolicy;
use crate::transport::gemini::DEFAULT_BASE_URL;

/// Environment variables read by [`EnhancerConfig::from_env`].
pub mod env {
    pub const API_KEY: &str = "GEMINI_API_KEY";
    /// Fallback credential variable.
    pub const API_KEY_FALLBACK: &str = "API_KEY";
    pub const BASE_URL: &str = "DEVPROMPT_BASE_URL";
    pub const MODEL: &str = "DEVPROMPT_MODEL";
    pub const THINKING_MODEL: &str = "DEVPROMPT_THINKING_MODEL";
    pub const TIMEOUT_SECS: &str = "DEVPROMPT_TIMEOUT_SECS";
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct EnhancerConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub models: ModelSelection,
    /// Longest wait for the response to start, and for each SSE event after
    /// that. A long reasoning run is not cut off as long as events keep
    /// arriving.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            models: ModelSelection::default(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl EnhancerConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.api_key = get(env::API_KEY)
            .or_else(|| get(env::API_KEY_FALLBACK))
            .map(SecretString::from);
        if let Some(base_url) = get(env::BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(model) = get(env::MODEL) {
            config.models.standard_model = model;
        }
        if let Some(model) = get(env::THINKING_MODEL) {
            config.models.reasoning_model = model;
        }
        if let Some(raw) = get(env::TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!(
                    target: "devprompt::config",
                    value = %raw,
                    "ignoring invalid {}", env::TIMEOUT_SECS
                ),
            }
        }
        config
    }

    /// Set API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set standard and reasoning models
    pub fn with_models(mut self, models: ModelSelection) -> Self {
        self.models = models;
        self
    }

    /// Set response and idle timeout
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether a non-blank API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}
