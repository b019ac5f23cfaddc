//! Type Conversions for EnhanceError
//!
//! From implementations for the error types the transport layer meets.

use super::types::EnhanceError;

impl From<reqwest::Error> for EnhanceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::transport(status.as_u16(), err.to_string()),
            None if err.is_timeout() => Self::network(format!("request timeout: {err}")),
            None if err.is_connect() || err.is_request() || err.is_body() => {
                Self::network(format!("network failure: {err}"))
            }
            None => Self::TransportError {
                status: None,
                message: err.to_string(),
                network: false,
            },
        }
    }
}

impl From<serde_json::Error> for EnhanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for EnhanceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
