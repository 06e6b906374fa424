use crate::core::errors::ExchangeError;
use crate::core::kernel::request::PreparedRequest;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Fully buffered HTTP response
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Pluggable round-tripper used by the client
///
/// Implementations return the complete body; the response is owned by the
/// caller and released when it is dropped.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn round_trip(&self, request: PreparedRequest) -> Result<HttpResponse, ExchangeError>;
}

/// Default transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ExchangeError> {
        Self::build(timeout_secs, user_agent, None)
    }

    /// Send every request through `proxy_url` (`http://` or `https://`)
    pub fn with_proxy(
        proxy_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ExchangeError> {
        Self::build(timeout_secs, user_agent, Some(proxy_url))
    }

    pub(crate) fn build(
        timeout_secs: u64,
        user_agent: &str,
        proxy_url: Option<&str>,
    ) -> Result<Self, ExchangeError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent);

        if let Some(proxy_url) = proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                ExchangeError::Validation(format!("Invalid proxy URL '{}': {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            ExchangeError::Transport(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with custom TLS roots
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn round_trip(&self, request: PreparedRequest) -> Result<HttpResponse, ExchangeError> {
        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ExchangeError::Validation(format!("Invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ExchangeError::Validation(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ExchangeError::Transport(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_url_is_validated() {
        assert!(ReqwestTransport::with_proxy("http://127.0.0.1:3128", 10, "test").is_ok());
        assert!(matches!(
            ReqwestTransport::with_proxy("not a url", 10, "test"),
            Err(ExchangeError::Validation(_))
        ));
    }

    #[test]
    fn test_response_header_lookup() {
        let mut response = HttpResponse::new(200, b"{}".to_vec());
        response.headers.insert(
            "x-mbx-used-weight-1m",
            HeaderValue::from_static("12"),
        );
        assert_eq!(response.header("X-MBX-USED-WEIGHT-1M"), Some("12"));
        assert_eq!(response.header("missing"), None);
    }
}
