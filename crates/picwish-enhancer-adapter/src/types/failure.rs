/*
[INPUT]:  Classified adapter errors
[OUTPUT]: Failure taxonomy attached to failed tasks, with user-facing messages
[POS]:    Data layer - error classification vocabulary shared with the controller
[UPDATE]: When the taxonomy or its user-facing wording changes
*/

use std::fmt;

/// Why a task ended in the failed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Payload failed local validation (empty, not an image)
    InvalidInput { reason: String },
    /// Transport-level failure on submit or poll
    NetworkError { detail: String },
    /// HTTP 401
    Unauthorized,
    /// HTTP 429
    RateLimited { retry_after: Option<u64> },
    /// Any other non-2xx response
    RemoteError { status: u16, message: String },
    /// 2xx response with an unexpected body
    ProtocolError { detail: String },
}

impl Failure {
    /// Short machine-friendly name of the classification
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::InvalidInput { .. } => "invalid_input",
            Failure::NetworkError { .. } => "network_error",
            Failure::Unauthorized => "unauthorized",
            Failure::RateLimited { .. } => "rate_limited",
            Failure::RemoteError { .. } => "remote_error",
            Failure::ProtocolError { .. } => "protocol_error",
        }
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            Failure::InvalidInput { reason } => format!("Please choose an image file ({reason})"),
            Failure::NetworkError { .. } => {
                "Network error. Please check your internet connection".to_string()
            }
            Failure::Unauthorized => "Invalid API key".to_string(),
            Failure::RateLimited { .. } => "Too many requests. Please try again later".to_string(),
            Failure::RemoteError { message, .. } => format!("API Error: {message}"),
            Failure::ProtocolError { .. } => "Invalid response format from API".to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(Failure::Unauthorized.to_string(), "Invalid API key");
        assert_eq!(
            Failure::RemoteError {
                status: 500,
                message: "boom".to_string()
            }
            .to_string(),
            "API Error: boom"
        );
        assert_eq!(
            Failure::RateLimited { retry_after: None }.user_message(),
            "Too many requests. Please try again later"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Failure::Unauthorized.kind(), "unauthorized");
        assert_eq!(
            Failure::ProtocolError {
                detail: String::new()
            }
            .kind(),
            "protocol_error"
        );
    }
}
