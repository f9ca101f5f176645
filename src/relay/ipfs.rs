//! IPFS relay
//!
//! Token metadata uploads to the storage API.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::Response;

use super::{error_response, preview, RelayError, UpstreamResponse, IPFS_PATH};
use crate::config::AppState;
use crate::http::content_type::{is_multipart_form, multipart_boundary};
use crate::logger;
use crate::multipart;

const RESPONSE_PREVIEW_BYTES: usize = 200;

/// Forward an upload to the storage API and answer with its JSON reply.
pub async fn relay_ipfs(
    state: &AppState,
    content_type: Option<HeaderValue>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let body = prepare_upload_body(content_type.as_ref().and_then(|v| v.to_str().ok()), body);

    match forward(state, content_type.as_ref(), body).await {
        Ok(upstream) => {
            logger::log_relay_response(
                IPFS_PATH,
                upstream.status.as_u16(),
                &preview(&upstream.body, RESPONSE_PREVIEW_BYTES),
            );
            build_response(upstream)
        }
        Err(e) => error_response(IPFS_PATH, &e),
    }
}

/// Normalise a multipart upload by decoding and re-encoding it with the
/// boundary from `content_type`. Anything that is not `multipart/form-data`
/// with a boundary passes through untouched.
///
/// Parts without a field name are dropped by the decoder. When that leaves
/// nothing while the original body was non-empty, the original is forwarded
/// so a body the codec cannot read is not replaced by an empty form.
pub fn prepare_upload_body(content_type: Option<&str>, body: Bytes) -> Bytes {
    let Some(content_type) = content_type else {
        return body;
    };
    let Some(boundary) = multipart_boundary(content_type) else {
        if is_multipart_form(content_type) {
            logger::log_warning(&format!(
                "{IPFS_PATH}: multipart upload without a boundary, forwarding unchanged"
            ));
        }
        return body;
    };

    let parts = multipart::decode(&body, &boundary);
    logger::log_upload_parts(&parts);

    if parts.is_empty() && !body.is_empty() {
        logger::log_warning(&format!(
            "{IPFS_PATH}: no named parts found in {} byte upload, forwarding unchanged",
            body.len()
        ));
        return body;
    }

    Bytes::from(multipart::encode(&parts, &boundary))
}

async fn forward(
    state: &AppState,
    content_type: Option<&HeaderValue>,
    body: Bytes,
) -> Result<UpstreamResponse, RelayError> {
    let client = &state.upstream;
    let url = &client.config().ipfs_url;
    let headers = client.ipfs_headers(content_type)?;

    logger::log_relay_forward(IPFS_PATH, url, body.len());
    client.post(url, headers, body).await
}

fn build_response(upstream: UpstreamResponse) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(upstream.body));
    *response.status_mut() = upstream.status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
