/*
[INPUT]:  Error sources (transport, HTTP status, response bodies, local validation)
[OUTPUT]: Structured error type plus the failure classification shown to users
[POS]:    Error handling layer - unified error type for the adapter crate
[UPDATE]: When adding new error sources or changing how errors are classified
*/

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::types::Failure;

/// Main error type for the PicWish adapter
#[derive(Error, Debug)]
pub enum EnhancerError {
    /// Transport-level failure (connect, DNS, timeout, broken body stream)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the API key (HTTP 401)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The service throttled the request (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit { retry_after: Option<u64> },

    /// Any other non-2xx response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// 2xx response whose body does not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Payload failed local validation before any request was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl EnhancerError {
    /// Build an error from a non-2xx status and its raw body.
    ///
    /// The remote `message` field is preferred; the canonical reason phrase is the fallback.
    pub fn from_response(status: StatusCode, body: &str, retry_after: Option<u64>) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
            });

        match status {
            StatusCode::UNAUTHORIZED => EnhancerError::Unauthorized { message },
            StatusCode::TOO_MANY_REQUESTS => EnhancerError::RateLimit { retry_after },
            _ => EnhancerError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Classify the error for a failed task.
    pub fn failure(&self) -> Failure {
        match self {
            EnhancerError::Http(err) => Failure::NetworkError {
                detail: err.to_string(),
            },
            EnhancerError::Unauthorized { .. } => Failure::Unauthorized,
            EnhancerError::RateLimit { retry_after } => Failure::RateLimited {
                retry_after: *retry_after,
            },
            EnhancerError::Api { status, message } => Failure::RemoteError {
                status: *status,
                message: message.clone(),
            },
            EnhancerError::InvalidResponse(detail) => Failure::ProtocolError {
                detail: detail.clone(),
            },
            EnhancerError::InvalidInput(reason) => Failure::InvalidInput {
                reason: reason.clone(),
            },
            // A job id the service handed us could not form a status URL.
            EnhancerError::UrlParse(err) => Failure::ProtocolError {
                detail: err.to_string(),
            },
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, EnhancerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, Failure::Unauthorized)]
    #[case(StatusCode::TOO_MANY_REQUESTS, Failure::RateLimited { retry_after: None })]
    #[case(
        StatusCode::INTERNAL_SERVER_ERROR,
        Failure::RemoteError { status: 500, message: "quota exhausted".to_string() }
    )]
    fn test_status_classification(#[case] status: StatusCode, #[case] expected: Failure) {
        let err = EnhancerError::from_response(status, r#"{"message":"quota exhausted"}"#, None);
        assert_eq!(err.failure(), expected);
    }

    #[test]
    fn test_remote_message_falls_back_to_reason_phrase() {
        let err = EnhancerError::from_response(StatusCode::BAD_GATEWAY, "<html>oops</html>", None);
        match err {
            EnhancerError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("Expected Api error variant, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_remote_message_is_ignored() {
        let err = EnhancerError::from_response(StatusCode::BAD_REQUEST, r#"{"message":"  "}"#, None);
        assert_eq!(
            err.failure(),
            Failure::RemoteError {
                status: 400,
                message: "Bad Request".to_string()
            }
        );
    }

    #[test]
    fn test_rate_limit_keeps_retry_after() {
        let err = EnhancerError::from_response(StatusCode::TOO_MANY_REQUESTS, "", Some(12));
        assert_eq!(
            err.failure(),
            Failure::RateLimited {
                retry_after: Some(12)
            }
        );
    }

    #[test]
    fn test_invalid_response_is_protocol_error() {
        let err = EnhancerError::InvalidResponse("missing data.task_id".to_string());
        assert!(matches!(err.failure(), Failure::ProtocolError { .. }));
    }
}
