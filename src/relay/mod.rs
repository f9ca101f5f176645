//! Upstream relays
//!
//! `/api/trade` forwards JSON trade requests to the trading API and streams
//! back whatever it answers (often a binary transaction). `/api/ipfs` forwards
//! token metadata uploads to the storage API, passing multipart bodies through
//! the codec on the way.

mod client;
mod error;
mod ipfs;
mod trade;

pub use client::{UpstreamClient, UpstreamResponse};
pub use error::RelayError;
pub use ipfs::{prepare_upload_body, relay_ipfs};
pub use trade::{forwardable_headers, relay_trade};

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::Response;

use crate::http;
use crate::logger;

pub const TRADE_PATH: &str = "/api/trade";
pub const IPFS_PATH: &str = "/api/ipfs";

/// Methods accepted on relay paths
pub const RELAY_ALLOW: &str = "POST, OPTIONS";

/// Read a whole request body, refusing anything over `limit` bytes.
pub async fn read_body<B>(body: B, limit: u64) -> Result<Bytes, RelayError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(RelayError::BodyTooLarge { limit })
        }
        Err(e) => Err(RelayError::Body(e.to_string())),
    }
}

/// Turn a relay failure into the JSON error response clients expect
pub fn error_response(route: &str, err: &RelayError) -> Response<Full<Bytes>> {
    match err {
        RelayError::BodyTooLarge { .. } => {
            logger::log_warning(&format!("{route}: {err}"));
            http::build_413_response()
        }
        _ => {
            logger::log_relay_error(route, err);
            http::build_json_error_response(err.status(), &err.to_string())
        }
    }
}

/// First `max` bytes of a body as text for log lines
fn preview(body: &[u8], max: usize) -> String {
    String::from_utf8_lossy(&body[..body.len().min(max)]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let body = Full::new(Bytes::from_static(b"{\"mint\":\"abc\"}"));
        let bytes = read_body(body, 1024).await.unwrap();
        assert_eq!(&bytes[..], b"{\"mint\":\"abc\"}");
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let body = Full::new(Bytes::from(vec![0u8; 64]));
        let err = read_body(body, 16).await.unwrap_err();
        assert!(matches!(err, RelayError::BodyTooLarge { limit: 16 }));
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(TRADE_PATH, &RelayError::BodyTooLarge { limit: 1 });
        assert_eq!(response.status(), 413);

        let response = error_response(TRADE_PATH, &RelayError::Body("reset".to_string()));
        assert_eq!(response.status(), 400);
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview(b"abcdef", 3), "abc");
        assert_eq!(preview(b"ab", 3), "ab");
        assert_eq!(preview(&[0xff, b'a'], 10), "\u{fffd}a");
    }
}
