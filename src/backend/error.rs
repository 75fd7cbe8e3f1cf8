//! Inference backend error types

use thiserror::Error;

/// Backend failure with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Timeout, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Status(code), message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::MalformedResponse, message)
    }

    pub fn empty_completion() -> Self {
        Self::new(
            BackendErrorKind::EmptyCompletion,
            "Response did not contain a completion",
        )
    }

    pub fn cancelled() -> Self {
        Self::new(BackendErrorKind::Cancelled, "Request cancelled")
    }

    /// Short text for the error flag shown under the transcript
    pub fn user_message(&self) -> String {
        match self.kind {
            BackendErrorKind::Network => "Could not reach the model server.".to_string(),
            BackendErrorKind::Timeout => "The model server took too long to answer.".to_string(),
            BackendErrorKind::Status(code) => format!("The model server returned HTTP {code}."),
            BackendErrorKind::MalformedResponse | BackendErrorKind::EmptyCompletion => {
                "The model server sent an unusable answer.".to_string()
            }
            BackendErrorKind::Cancelled => "Request cancelled.".to_string(),
        }
    }
}

/// Every kind maps to the Failed turn outcome; none are retried automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connection refused, DNS, reset
    Network,
    /// No answer within the configured request timeout
    Timeout,
    /// Non-2xx HTTP status
    Status(u16),
    /// Body was not JSON
    MalformedResponse,
    /// JSON without a usable completion field
    EmptyCompletion,
    /// Abandoned by the user or at shutdown
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            BackendError::status(502, "bad gateway").user_message(),
            "The model server returned HTTP 502."
        );
        assert_eq!(
            BackendError::empty_completion().user_message(),
            BackendError::malformed("x").user_message()
        );
        assert_eq!(BackendError::cancelled().kind, BackendErrorKind::Cancelled);
    }

    #[test]
    fn test_display_is_detail_message() {
        let err = BackendError::network("Connection failed: refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }
}
