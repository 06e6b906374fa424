use crate::core::config::ClientConfig;
use crate::core::errors::{ApiError, ExchangeError};
use crate::core::kernel::context::Context;
use crate::core::kernel::request::{PreparedRequest, Request, RequestOption, SecurityType};
use crate::core::kernel::signer::{KeyType, Signer};
use crate::core::kernel::transport::{HttpTransport, ReqwestTransport};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument};

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const USED_WEIGHT_HEADER: &str = "X-MBX-USED-WEIGHT-1M";

/// Source of the local wall clock, in milliseconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            clock: None,
        }
    }

    /// Replace the HTTP transport; the config's proxy and timeout are then ignored
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Client, ExchangeError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::build(
                self.config.timeout_secs,
                &self.config.user_agent,
                self.config.proxy.as_deref(),
            )?),
        };

        let base_url = self.config.resolved_base_url();
        info!(base_url = %base_url, key_type = %self.config.key_type, "Created Binance REST client");

        Ok(Client {
            api_key: self.config.api_key,
            secret_key: self.config.secret_key,
            key_type: self.config.key_type,
            base_url,
            user_agent: self.config.user_agent,
            debug: self.config.debug,
            time_offset: AtomicI64::new(0),
            transport,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            signer: OnceLock::new(),
        })
    }
}

/// Binance REST client
///
/// Owns credentials, the transport and the server time offset. Every endpoint
/// service borrows a `Client` and funnels through [`Client::call_api`]. Share
/// it across tasks behind an `Arc`.
pub struct Client {
    api_key: Secret<String>,
    secret_key: Secret<String>,
    key_type: KeyType,
    base_url: String,
    user_agent: String,
    debug: bool,
    time_offset: AtomicI64,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    signer: OnceLock<Arc<dyn Signer>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("key_type", &self.key_type)
            .field("debug", &self.debug)
            .field("time_offset", &self.time_offset())
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ExchangeError> {
        ClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Point the client at another host; call before issuing requests
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Local clock minus server clock, in milliseconds
    pub fn time_offset(&self) -> i64 {
        self.time_offset.load(Ordering::Relaxed)
    }

    pub fn set_time_offset(&self, offset_ms: i64) {
        self.time_offset.store(offset_ms, Ordering::Relaxed);
    }

    pub fn local_time_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Timestamp presented to the server on signed requests
    pub fn timestamp_ms(&self) -> i64 {
        self.clock.now_ms() - self.time_offset()
    }

    fn signer(&self) -> Result<Arc<dyn Signer>, ExchangeError> {
        if let Some(signer) = self.signer.get() {
            return Ok(Arc::clone(signer));
        }
        let signer: Arc<dyn Signer> =
            Arc::from(self.key_type.signer(self.secret_key.expose_secret())?);
        Ok(Arc::clone(self.signer.get_or_init(|| signer)))
    }

    /// Canonicalize, stamp and sign `request` without sending it
    ///
    /// Signed requests get `recvWindow` (when positive), `timestamp` and a
    /// trailing `signature` in the query. The signature covers the encoded
    /// query followed directly by the encoded form. Public and API-key
    /// requests carry none of the three.
    ///
    /// # Arguments
    /// * `request` - Request with options already applied
    ///
    /// # Returns
    /// The URL, headers and body handed to the [`HttpTransport`]
    pub fn prepare(&self, request: &Request) -> Result<PreparedRequest, ExchangeError> {
        request.validate()?;

        let signed = request.security == SecurityType::Signed;
        let mut query = request.query.clone();
        if signed {
            if let Some(recv_window) = request.recv_window.filter(|w| *w > 0) {
                query.set("recvWindow", recv_window);
            }
            query.set("timestamp", self.timestamp_ms());
        }

        let mut query_string = query.encode()?;
        let form_string = request.form.encode()?;

        let mut headers = request.headers.clone();
        push_default_header(&mut headers, "User-Agent", &self.user_agent);

        let body = if form_string.is_empty() {
            None
        } else {
            push_default_header(&mut headers, "Content-Type", FORM_CONTENT_TYPE);
            Some(form_string.clone())
        };

        if request.security.needs_api_key() {
            let api_key = self.api_key.expose_secret();
            if api_key.is_empty() {
                return Err(ExchangeError::Validation(format!(
                    "{} requires an API key",
                    request.endpoint
                )));
            }
            headers.push((API_KEY_HEADER.to_string(), api_key.clone()));
        }

        if signed {
            let canonical = format!("{}{}", query_string, form_string);
            let signature = self.signer()?.sign(&canonical)?;
            let encoded = serde_urlencoded::to_string(&[("signature", signature.as_str())])
                .map_err(|e| ExchangeError::Signing(format!("Failed to encode signature: {}", e)))?;
            if !query_string.is_empty() {
                query_string.push('&');
            }
            query_string.push_str(&encoded);
        }

        let mut url = format!("{}{}", self.base_url, request.endpoint);
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }

        Ok(PreparedRequest {
            method: request.method.clone(),
            url,
            headers,
            body,
            query_string,
            form_string,
        })
    }

    /// Send `request` and return the raw success body
    ///
    /// Options are applied before validation. Bodies of responses with a
    /// status of 400 or above are decoded into [`ExchangeError::Api`] or, when
    /// they are not an error envelope, [`ExchangeError::InvalidEnvelope`].
    /// In debug mode the prepared request and the response are logged at
    /// `debug` level.
    ///
    /// # Arguments
    /// * `ctx` - Cancellation and deadline scope; checked before dispatch and raced against the transport
    /// * `request` - Endpoint, security level and parameters
    /// * `opts` - Per-call options applied in order
    ///
    /// # Returns
    /// The response body for statuses below 400
    #[instrument(skip_all, fields(method = %request.method, endpoint = %request.endpoint))]
    pub async fn call_api(
        &self,
        ctx: &Context,
        mut request: Request,
        opts: &[RequestOption],
    ) -> Result<Vec<u8>, ExchangeError> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        for opt in opts {
            opt.apply(&mut request);
        }
        let prepared = self.prepare(&request)?;

        if self.debug {
            debug!(
                method = %prepared.method,
                url = %prepared.url,
                body = prepared.body.as_deref().unwrap_or(""),
                "request"
            );
        }

        let response = ctx.run(self.transport.round_trip(prepared)).await?;

        if self.debug {
            debug!(
                status = response.status,
                used_weight = response.header(USED_WEIGHT_HEADER).unwrap_or("-"),
                headers = ?response.headers,
                body = %String::from_utf8_lossy(&response.body),
                "response"
            );
        }

        if response.status >= 400 {
            return Err(ApiError::from_response(response.status, &response.body));
        }
        Ok(response.body)
    }

    /// [`Self::call_api`] followed by JSON decoding into `T`
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: Request,
        opts: &[RequestOption],
    ) -> Result<T, ExchangeError> {
        let body = self.call_api(ctx, request, opts).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn push_default_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if !headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
        headers.push((name.to_string(), value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::signer::sign;
    use crate::core::kernel::transport::HttpResponse;
    use async_trait::async_trait;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    struct NoopTransport;

    #[async_trait]
    impl HttpTransport for NoopTransport {
        async fn round_trip(&self, _request: PreparedRequest) -> Result<HttpResponse, ExchangeError> {
            Ok(HttpResponse::new(200, b"{}".to_vec()))
        }
    }

    fn client(now: i64) -> Client {
        Client::builder(ClientConfig::new("k".into(), "s".into()).base_url("https://api.test"))
            .with_transport(Arc::new(NoopTransport))
            .with_clock(Arc::new(FixedClock(now)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_public_request_carries_no_credentials() {
        let client = client(1_000);
        let mut request = Request::get("/api/v3/depth", SecurityType::None);
        request.set_param("symbol", "BTCUSDT");
        request.recv_window = Some(0);

        let prepared = client.prepare(&request).unwrap();
        assert_eq!(prepared.url, "https://api.test/api/v3/depth?symbol=BTCUSDT");
        assert!(prepared.header(API_KEY_HEADER).is_none());
        assert!(!prepared.url.contains("timestamp="));
        assert!(!prepared.url.contains("signature="));
        assert!(!prepared.url.contains("recvWindow="));
        assert!(prepared.body.is_none());
    }

    #[test]
    fn test_api_key_request_is_not_signed() {
        let client = client(1_000);
        let request = Request::post("/api/v3/userDataStream", SecurityType::ApiKey);

        let prepared = client.prepare(&request).unwrap();
        assert_eq!(prepared.header(API_KEY_HEADER), Some("k"));
        assert_eq!(prepared.url, "https://api.test/api/v3/userDataStream");
        assert!(prepared.header("Content-Type").is_none());
    }

    #[test]
    fn test_signed_empty_request_signs_timestamp_only() {
        let client = client(1_700_000_000_000);
        let request = Request::get("/api/v3/account", SecurityType::Signed);

        let prepared = client.prepare(&request).unwrap();
        let expected_sig = sign(KeyType::Hmac, "s", "timestamp=1700000000000").unwrap();
        assert_eq!(
            prepared.query_string,
            format!("timestamp=1700000000000&signature={}", expected_sig)
        );
    }

    #[test]
    fn test_signature_covers_query_then_form() {
        let client = client(5_000);
        client.set_time_offset(-250);
        let mut request = Request::post("/api/v3/order", SecurityType::Signed);
        request.set_form("symbol", "BTCUSDT").set_form("side", "SELL");
        request.recv_window = Some(6000);

        let prepared = client.prepare(&request).unwrap();
        assert_eq!(prepared.form_string, "side=SELL&symbol=BTCUSDT");
        assert_eq!(prepared.body.as_deref(), Some("side=SELL&symbol=BTCUSDT"));
        assert_eq!(prepared.header("content-type"), Some(FORM_CONTENT_TYPE));

        let unsigned = "recvWindow=6000&timestamp=5250";
        let expected_sig = sign(
            KeyType::Hmac,
            "s",
            &format!("{}{}", unsigned, prepared.form_string),
        )
        .unwrap();
        assert_eq!(
            prepared.query_string,
            format!("{}&signature={}", unsigned, expected_sig)
        );
        assert!(!prepared.body.unwrap().contains("signature="));
    }

    #[test]
    fn test_recv_window_only_on_signed_requests() {
        let client = client(1_000);
        for security in [SecurityType::None, SecurityType::ApiKey] {
            let mut request = Request::get("/api/v3/ping", security);
            request.recv_window = Some(5000);
            let prepared = client.prepare(&request).unwrap();
            assert_eq!(prepared.url, "https://api.test/api/v3/ping");
        }
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let client = client(1_000);
        let mut request = Request::post("/api/v3/order", SecurityType::Signed);
        request
            .set_form("symbol", "BTCUSDT")
            .set_header("user-agent", "mine")
            .set_header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8");

        let prepared = client.prepare(&request).unwrap();
        let agents: Vec<_> = prepared
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("User-Agent"))
            .collect();
        assert_eq!(agents.len(), 1);
        assert_eq!(prepared.header("User-Agent"), Some("mine"));
        assert_eq!(
            prepared.header("Content-Type"),
            Some("application/x-www-form-urlencoded; charset=utf-8")
        );
    }

    #[test]
    fn test_repeated_keys_are_signed_in_order() {
        let client = client(1_700_000_000_000);
        let mut request = Request::delete("/api/v3/openOrders", SecurityType::Signed);
        request.append_param("orderId", 7).append_param("orderId", 3);

        let prepared = client.prepare(&request).unwrap();
        assert_eq!(prepared.form_string, "orderId=7&orderId=3");
        let expected_sig = sign(
            KeyType::Hmac,
            "s",
            "timestamp=1700000000000orderId=7&orderId=3",
        )
        .unwrap();
        assert!(prepared
            .query_string
            .ends_with(&format!("&signature={}", expected_sig)));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let client = Client::builder(ClientConfig::read_only())
            .with_transport(Arc::new(NoopTransport))
            .build()
            .unwrap();
        let request = Request::get("/api/v3/account", SecurityType::Signed);
        assert!(matches!(
            client.prepare(&request),
            Err(ExchangeError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_key_material_fails_before_dispatch() {
        let client = Client::builder(
            ClientConfig::new("k".into(), "not-a-pem".into()).key_type(KeyType::Rsa),
        )
        .with_transport(Arc::new(NoopTransport))
        .build()
        .unwrap();

        let public = Request::get("/api/v3/ping", SecurityType::None);
        assert!(client.prepare(&public).is_ok());

        let signed = Request::get("/api/v3/account", SecurityType::Signed);
        assert!(matches!(
            client.prepare(&signed),
            Err(ExchangeError::Signing(_))
        ));
    }

    #[test]
    fn test_debug_output_hides_credentials() {
        let client = client(0);
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("\"s\""));
        assert!(rendered.contains("base_url"));
    }
}
