//! Trade relay
//!
//! JSON in, upstream answer out with its headers.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING};
use hyper::Response;

use super::{error_response, preview, RelayError, UpstreamResponse, TRADE_PATH};
use crate::config::AppState;
use crate::logger;

const REQUEST_PREVIEW_BYTES: usize = 500;

/// Forward a trade request body to the trading API.
pub async fn relay_trade(state: &AppState, body: Bytes) -> Response<Full<Bytes>> {
    logger::log_debug(&format!(
        "[Relay] trade request body: {}",
        preview(&body, REQUEST_PREVIEW_BYTES)
    ));

    match forward(state, body).await {
        Ok(upstream) => {
            logger::log_relay_response(
                TRADE_PATH,
                upstream.status.as_u16(),
                &format!("length: {}", upstream.body.len()),
            );
            build_response(upstream)
        }
        Err(e) => error_response(TRADE_PATH, &e),
    }
}

async fn forward(state: &AppState, body: Bytes) -> Result<UpstreamResponse, RelayError> {
    let client = &state.upstream;
    let url = &client.config().trade_url;
    let headers = client.trade_headers()?;

    logger::log_relay_forward(TRADE_PATH, url, body.len());
    client.post(url, headers, body).await
}

/// Upstream headers that can be passed back to the client as-is.
///
/// Framing headers are dropped because the response is re-framed locally.
pub fn forwardable_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    headers.remove(TRANSFER_ENCODING);
    headers.remove(CONTENT_LENGTH);
    headers.remove(CONNECTION);
    headers
}

fn build_response(upstream: UpstreamResponse) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = forwardable_headers(&upstream.headers);
    response
}
