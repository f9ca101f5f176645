//! Upstream HTTP client
//!
//! Thin wrapper over `reqwest` that sends the browser-like headers the trade
//! and storage APIs expect and buffers the whole upstream response.

use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT,
};
use hyper::StatusCode;
use std::time::Duration;

use super::RelayError;
use crate::config::UpstreamConfig;

/// Fully buffered upstream response
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Client for the trade and storage upstreams
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a client with the configured request timeout.
    pub fn new(config: &UpstreamConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Headers for the trade API: always JSON, pumpportal origin.
    pub fn trade_headers(&self) -> Result<HeaderMap, RelayError> {
        let mut headers =
            self.browser_headers(&self.config.trade_origin, &self.config.trade_referer)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Headers for the storage API, keeping the caller's content type so the
    /// multipart boundary still matches the body.
    pub fn ipfs_headers(
        &self,
        content_type: Option<&HeaderValue>,
    ) -> Result<HeaderMap, RelayError> {
        let mut headers =
            self.browser_headers(&self.config.ipfs_origin, &self.config.ipfs_referer)?;
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, content_type.clone());
        }
        headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("empty"));
        headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("cors"));
        headers.insert("Sec-Fetch-Site", HeaderValue::from_static("same-origin"));
        Ok(headers)
    }

    fn browser_headers(&self, origin: &str, referer: &str) -> Result<HeaderMap, RelayError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.config.user_agent)?);
        headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
        headers.insert(REFERER, HeaderValue::from_str(referer)?);
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&self.config.accept_language)?,
        );
        Ok(headers)
    }

    /// POST `body` to `url` and buffer the response.
    pub async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, RelayError> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client() -> UpstreamClient {
        let cfg = Config::load_from("does-not-exist/relay-config").unwrap();
        UpstreamClient::new(&cfg.upstream).unwrap()
    }

    #[test]
    fn test_trade_headers() {
        let headers = client().trade_headers().unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ORIGIN], "https://pumpportal.fun");
        assert_eq!(headers[REFERER], "https://pumpportal.fun/");
        assert_eq!(headers[ACCEPT], "*/*");
        assert!(headers[USER_AGENT].to_str().unwrap().starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_ipfs_headers_keep_content_type() {
        let content_type = HeaderValue::from_static("multipart/form-data; boundary=abc");
        let headers = client().ipfs_headers(Some(&content_type)).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "multipart/form-data; boundary=abc");
        assert_eq!(headers[ORIGIN], "https://pump.fun");
        assert_eq!(headers[REFERER], "https://pump.fun/create");
        assert_eq!(headers["sec-fetch-site"], "same-origin");
    }

    #[test]
    fn test_ipfs_headers_without_content_type() {
        let headers = client().ipfs_headers(None).unwrap();
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_invalid_configured_header() {
        let mut cfg = Config::load_from("does-not-exist/relay-config").unwrap();
        cfg.upstream.user_agent = "bad\nagent".to_string();
        let client = UpstreamClient::new(&cfg.upstream).unwrap();
        assert!(matches!(
            client.trade_headers(),
            Err(RelayError::InvalidHeader(_))
        ));
    }
}
