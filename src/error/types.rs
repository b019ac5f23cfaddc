//! Core error types.

use thiserror::Error;

/// Closed set of semantic error kinds surfaced to callers.
///
/// Every [`EnhanceError`] resolves to exactly one kind via [`EnhanceError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401: missing, invalid or expired credential.
    Unauthorized,
    /// 403: credential lacks permission.
    Forbidden,
    /// 404: requested model is not available.
    NotFound,
    /// 400: malformed request or configuration.
    InvalidRequest,
    /// 500: upstream internal error.
    ServerError,
    /// 503: upstream overloaded.
    Unavailable,
    /// 429: quota exceeded.
    RateLimited,
    /// Connectivity failure before or during the exchange.
    NetworkFailure,
    /// No usable credential configured.
    ConfigurationMissing,
    /// Anything not covered above.
    Unknown,
}

impl ErrorKind {
    /// Whether a UI should offer the user a retry affordance for this kind.
    pub const fn is_user_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError | Self::Unavailable)
    }

    /// Kind implied by an HTTP status code, if the status is one the
    /// pipeline classifies.
    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::InvalidRequest),
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            429 => Some(Self::RateLimited),
            500 => Some(Self::ServerError),
            503 => Some(Self::Unavailable),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::InvalidRequest => "invalid_request",
            Self::ServerError => "server_error",
            Self::Unavailable => "unavailable",
            Self::RateLimited => "rate_limited",
            Self::NetworkFailure => "network_failure",
            Self::ConfigurationMissing => "configuration_missing",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Errors produced by the enhancement pipeline.
///
/// `TransportError` is the raw shape a transport reports; the executor turns
/// it into one of the classified variants on terminal failure. Values are
/// built once and never mutated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EnhanceError {
    /// HTTP-classified failure with a known status code.
    #[error("{message}")]
    ApiError {
        status: u16,
        kind: ErrorKind,
        message: String,
    },

    /// Status 429. Kept apart from `ApiError` so callers can show a countdown.
    #[error("{message}")]
    RateLimitError { message: String },

    /// Missing or unusable credential.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Input rejected before any request was made.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Connectivity failure.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Unclassified failure reported by the transport.
    #[error("Transport error{}: {message}", status_suffix(.status))]
    TransportError {
        status: Option<u16>,
        message: String,
        /// Set when the failure happened below HTTP (connect, timeout, body read).
        network: bool,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Operation cancelled")]
    Cancelled,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl EnhanceError {
    /// Build a raw transport error from an HTTP status and provider message.
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        Self::TransportError {
            status: Some(status),
            message: message.into(),
            network: false,
        }
    }

    /// Build a raw transport error for a failure below HTTP.
    pub fn network(message: impl Into<String>) -> Self {
        Self::TransportError {
            status: None,
            message: message.into(),
            network: true,
        }
    }

    /// Status code carried by the error, if any.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RateLimitError { .. } => Some(429),
            Self::TransportError { status, .. } => *status,
            _ => None,
        }
    }

    /// Human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::ApiError { message, .. }
            | Self::RateLimitError { message }
            | Self::TransportError { message, .. } => message.clone(),
            Self::ConfigurationError(m)
            | Self::ValidationError(m)
            | Self::NetworkError(m)
            | Self::ParseError(m)
            | Self::StreamError(m) => m.clone(),
            Self::Cancelled => "operation cancelled".to_string(),
        }
    }

    /// Resolve the error to its semantic kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ApiError { kind, .. } => *kind,
            Self::RateLimitError { .. } => ErrorKind::RateLimited,
            Self::ConfigurationError(_) => ErrorKind::ConfigurationMissing,
            Self::ValidationError(_) => ErrorKind::InvalidRequest,
            Self::NetworkError(_) => ErrorKind::NetworkFailure,
            Self::TransportError {
                status: Some(status),
                ..
            } => ErrorKind::from_status(*status).unwrap_or(ErrorKind::Unknown),
            Self::TransportError { network: true, .. } => ErrorKind::NetworkFailure,
            _ => ErrorKind::Unknown,
        }
    }

    /// Whether the retry policy should try again after this error.
    ///
    /// Retries on 429/500/503, on failures below HTTP, and on messages that
    /// mention "network", "fetch" or "timeout".
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConfigurationError(_) | Self::ValidationError(_) | Self::Cancelled => {
                return false;
            }
            Self::TransportError { network: true, .. } | Self::NetworkError(_) => return true,
            _ => {}
        }
        if matches!(self.status_code(), Some(429 | 500 | 503)) {
            return true;
        }
        let message = self.message().to_lowercase();
        ["network", "fetch", "timeout"]
            .iter()
            .any(|needle| message.contains(needle))
    }
}
