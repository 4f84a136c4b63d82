//! Error types for the Smartlead client.

use serde::Deserialize;
use smartlead_core::AdapterError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur when talking to an upstream service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// A caller-supplied value cannot be used in a request.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Create an API error from a status code and response body.
    ///
    /// Prefers the body's `message` field, then `error`, then the raw text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|r| r.message.or(r.error))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("request failed with status code {}", status)
                } else {
                    body.trim().to_string()
                }
            });
        Self::Api { status, message }
    }
}

impl From<ClientError> for AdapterError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Api { status, message } => AdapterError::new(Some(status), message),
            other => AdapterError::new(other.status(), other.to_string()),
        }
    }
}

/// Error body shape shared by the upstream services.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_prefers_message() {
        let err = ClientError::from_response(404, r#"{"message":"Campaign not found","error":"x"}"#);
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Campaign not found");
            }
            _ => panic!("Expected Api error"),
        }
    }

    #[test]
    fn test_from_response_falls_back() {
        let err = ClientError::from_response(400, r#"{"error":"Bad Request"}"#);
        assert_eq!(err.to_string(), "API error (status 400): Bad Request");

        let err = ClientError::from_response(502, "");
        assert_eq!(
            err.to_string(),
            "API error (status 502): request failed with status code 502"
        );

        let err = ClientError::from_response(500, "upstream exploded");
        assert_eq!(err.to_string(), "API error (status 500): upstream exploded");
    }

    #[test]
    fn test_into_adapter_error_keeps_upstream_message() {
        let adapter: AdapterError = ClientError::from_response(422, r#"{"message":"bad lead"}"#).into();
        assert_eq!(adapter.status, Some(422));
        assert_eq!(adapter.message.as_deref(), Some("bad lead"));
    }
}
