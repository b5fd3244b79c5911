//! API error types for the collection client.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the incubator API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Authentication failed or no token was supplied.
    #[error("Authentication failed: check your API token")]
    Unauthorized,

    /// The token is valid but lacks access to the resource.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The server rejected the submitted fields (HTTP 422).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Any other non-2xx response.
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// The HTTP status code.
        status: u16,
        /// The decoded error detail, or the request URL when no body was sent.
        message: String,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The configured base URL or entity path is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Keyring error when retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            422 => ApiError::Validation(context.to_string()),
            code => ApiError::Server {
                status: code,
                message: context.to_string(),
            },
        }
    }
}

/// The error body shape used by the incubator API.
///
/// `detail` is either a plain message or a list of validation entries.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Entries(Vec<serde_json::Value>),
}

/// Extract a human-readable message from an error response body.
///
/// Returns `None` if the body does not follow the `{ "detail": ... }` shape.
pub fn detail_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        ErrorDetail::Message(msg) => Some(msg),
        ErrorDetail::Entries(entries) => {
            let messages: Vec<String> = entries
                .iter()
                .map(|entry| {
                    entry
                        .get("msg")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| entry.to_string())
                })
                .collect();
            Some(messages.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "test");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "startups/3");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "startups/3"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_422_is_validation() {
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "email: invalid");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_error_from_status_500() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            _ => panic!("Expected Server error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Server {
            status: 409,
            message: "conflict".to_string(),
        };
        assert_eq!(err.to_string(), "Server error (HTTP 409): conflict");
    }

    #[test]
    fn test_detail_message_string() {
        assert_eq!(
            detail_message(r#"{"detail": "Startup not found"}"#),
            Some("Startup not found".to_string())
        );
    }

    #[test]
    fn test_detail_message_entries() {
        let body = r#"{"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email"}, {"msg": "field required"}]}"#;
        assert_eq!(
            detail_message(body),
            Some("value is not a valid email, field required".to_string())
        );
    }

    #[test]
    fn test_detail_message_entry_without_msg() {
        let body = r#"{"detail": [{"code": 1}]}"#;
        assert_eq!(detail_message(body), Some(r#"{"code":1}"#.to_string()));
    }

    #[test]
    fn test_detail_message_unknown_shape() {
        assert_eq!(detail_message(r#"{"error": "nope"}"#), None);
        assert_eq!(detail_message("not json"), None);
    }
}
