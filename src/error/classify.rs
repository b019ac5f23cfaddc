//! Translation of terminal transport failures into the typed taxonomy.

use super::types::{EnhanceError, ErrorKind};

/// Classify a terminal failure.
///
/// Status codes take precedence over message heuristics. `model` is the model
/// the request targeted and is named in the not-found message. Errors that
/// are already classified, and errors nothing matches, come back unchanged.
pub fn classify(error: EnhanceError, model: &str) -> EnhanceError {
    match &error {
        EnhanceError::TransportError { .. }
        | EnhanceError::ParseError(_)
        | EnhanceError::StreamError(_) => {}
        _ => return error,
    }

    if let Some(status) = error.status_code() {
        let message = match status {
            400 => "Invalid request: check the input text and the selected options.".to_string(),
            401 => "Invalid or expired API key: update the configured credential.".to_string(),
            403 => "Access forbidden: the API key is not allowed to use this model.".to_string(),
            404 => format!("Model `{model}` was not found or is not available for this API key."),
            429 => {
                return EnhanceError::RateLimitError {
                    message: "Rate limit exceeded: API quota reached, wait before retrying."
                        .to_string(),
                };
            }
            500 => "The model provider hit an internal error, try again shortly.".to_string(),
            503 => "The model provider is overloaded right now, try again shortly.".to_string(),
            _ => String::new(),
        };
        if let Some(kind) = ErrorKind::from_status(status) {
            return EnhanceError::ApiError {
                status,
                kind,
                message,
            };
        }
    }

    let lower = error.message().to_lowercase();
    if lower.contains("api key") {
        return EnhanceError::ConfigurationError(
            "API key is missing or invalid: set GEMINI_API_KEY.".to_string(),
        );
    }
    let network_flag = matches!(error, EnhanceError::TransportError { network: true, .. });
    if network_flag || lower.contains("network") || lower.contains("fetch") {
        return EnhanceError::NetworkError(
            "unable to reach the model provider, check the internet connection.".to_string(),
        );
    }

    error
}
