//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: CORS preflight, method checks,
//! dispatch to the upstream relays or static files, and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::relay::{self, IPFS_PATH, RELAY_ALLOW, TRADE_PATH};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, IF_NONE_MATCH, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Methods accepted on static paths
const STATIC_ALLOW: &str = "GET, HEAD, OPTIONS";

/// Request context for static file serving
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    if state.config.http.enable_cors {
        http::apply_cors_headers(&mut response);
    }
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(entry) = access_entry {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        let entry = entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() == Method::OPTIONS {
        return http::build_options_response();
    }

    let path = req.uri().path().to_string();
    match path.as_str() {
        TRADE_PATH | IPFS_PATH => relay_request(req, &path, state).await,
        _ => static_request(req, &path, state).await,
    }
}

/// Read the body and hand it to the matching relay
async fn relay_request<B>(
    req: Request<B>,
    path: &str,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() != Method::POST {
        logger::log_warning(&format!("Method not allowed: {} {path}", req.method()));
        return http::build_405_response(RELAY_ALLOW);
    }

    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return resp;
    }

    let content_type = req.headers().get(CONTENT_TYPE).cloned();
    let body = match relay::read_body(req.into_body(), max_body_size).await {
        Ok(body) => body,
        Err(e) => return relay::error_response(path, &e),
    };

    if path == TRADE_PATH {
        relay::relay_trade(state, body).await
    } else {
        relay::relay_ipfs(state, content_type, body).await
    }
}

async fn static_request<B>(
    req: Request<B>,
    path: &str,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    if method != Method::GET && method != Method::HEAD {
        logger::log_warning(&format!("Method not allowed: {method} {path}"));
        return http::build_405_response(STATIC_ALLOW);
    }

    let ctx = RequestContext {
        path,
        is_head: method == Method::HEAD,
        if_none_match: req
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };
    drop(req);

    static_files::serve(&ctx, &state.config.static_files).await
}

/// Reject a declared Content-Length over the limit before reading the body
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    match content_length.to_str().ok()?.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        _ => None,
    }
}
