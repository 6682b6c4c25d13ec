//! Remote store errors.
//!
//! The store reports failures as a status/code/message triple. Kumiko
//! treats these as opaque: they are carried verbatim to the invoking
//! operation, never retried, never interpreted beyond the not-found probe
//! used for the page → database fallback.

use serde::Deserialize;
use thiserror::Error;

/// An error from the remote store or the transport beneath it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The store rejected the call with its structured error object.
    #[error("Notion API error ({status}): [{code}] {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// Non-success HTTP response whose body was not a store error object.
    #[error("Notion API error ({status}): {body}")]
    Http { status: u16, body: String },
    /// The request never completed (DNS, TLS, connection, decode).
    #[error("transport error: {0}")]
    Transport(String),
    /// No credential in the environment.
    #[error("NOTION_API_KEY environment variable is required")]
    MissingApiKey,
}

/// Error body shape returned by the store:
/// `{"object": "error", "status": 400, "code": "...", "message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Classify a non-success response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                code: Some(code),
                message: Some(message),
            }) => ApiError::Api {
                status,
                code,
                message,
            },
            _ => ApiError::Http {
                status,
                body: body.trim().to_string(),
            },
        }
    }

    /// Whether this error means "no such object" — used to retry a page
    /// lookup as a database lookup, nothing else.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Api { status, code, .. } => *status == 404 || code == "object_not_found",
            ApiError::Http { status, .. } => *status == 404,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_store_error_body() {
        let err = ApiError::from_response(
            404,
            r#"{"object":"error","status":404,"code":"object_not_found","message":"Could not find page."}"#,
        );
        match &err {
            ApiError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(*status, 404);
                assert_eq!(code, "object_not_found");
                assert_eq!(message, "Could not find page.");
            }
            other => panic!("wrong variant: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Notion API error (404): [object_not_found] Could not find page."
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unparseable_body_falls_back_to_http() {
        let err = ApiError::from_response(502, "<html>bad gateway</html>");
        assert!(matches!(err, ApiError::Http { status: 502, .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_not_found_on_code_only() {
        let err = ApiError::Api {
            status: 400,
            code: "object_not_found".into(),
            message: "gone".into(),
        };
        assert!(err.is_not_found());

        let err = ApiError::Api {
            status: 429,
            code: "rate_limited".into(),
            message: "slow down".into(),
        };
        assert!(!err.is_not_found());
    }
}
