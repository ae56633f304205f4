//! Error types for the Hop server client

use hop_core::dto::WebResult;
use hop_project::ProjectError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to a Hop server
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server answered with a failure envelope
    #[error("{result}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// `<result>` of the envelope
        result: String,
        /// `<message>` of the envelope
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The registration payload could not be built
    #[error("Failed to build payload: {0}")]
    Payload(#[from] ProjectError),
}

impl ClientError {
    /// Builds a `Server` error from a failed response body
    ///
    /// Hop answers failures with a `<webresult>` envelope; anything else is
    /// reported with the raw body as message.
    pub fn from_failure(status: u16, body: &[u8]) -> Self {
        match WebResult::parse(body) {
            Ok(web) => Self::Server {
                status,
                result: web.result,
                message: web.message,
            },
            Err(_) => Self::Server {
                status,
                result: "ERROR".to_string(),
                message: String::from_utf8_lossy(body).trim().to_string(),
            },
        }
    }

    /// HTTP status of a server failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
            || matches!(self, Self::Payload(e) if e.is_not_found())
    }

    /// Check if this error is an authentication failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_failure_envelope() {
        let err = ClientError::from_failure(
            500,
            b"<webresult><result>ERROR</result><message>Unable to find pipeline people</message></webresult>",
        );
        match &err {
            ClientError::Server { status, result, message } => {
                assert_eq!(*status, 500);
                assert_eq!(result, "ERROR");
                assert_eq!(message, "Unable to find pipeline people");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "ERROR: Unable to find pipeline people");
    }

    #[test]
    fn test_from_failure_without_envelope() {
        let err = ClientError::from_failure(401, b"  Unauthorized\n");
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "ERROR: Unauthorized");
    }
}
