//! Error types for the upstream relays.

use hyper::StatusCode;
use thiserror::Error;

/// Errors that can occur while relaying a request upstream.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Building, sending or reading an upstream request failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// A configured header value is not a valid HTTP header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] hyper::header::InvalidHeaderValue),

    /// The incoming request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(String),

    /// The incoming request body exceeded `http.max_body_size`.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },
}

impl RelayError {
    /// Status returned to the client for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::InvalidHeader(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::BodyTooLarge { limit: 10 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            RelayError::Body("reset".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RelayError::BodyTooLarge { limit: 10 }.to_string(),
            "request body exceeds 10 bytes"
        );
    }
}
