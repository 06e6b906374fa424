use crate::core::errors::ExchangeError;
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::sync::Arc;

/// Authentication regime required by an endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SecurityType {
    /// Public endpoint, no credentials attached
    #[default]
    None,
    /// `X-MBX-APIKEY` header only
    ApiKey,
    /// API key header plus `timestamp` and `signature` query parameters
    Signed,
}

impl SecurityType {
    pub const fn needs_api_key(self) -> bool {
        matches!(self, Self::ApiKey | Self::Signed)
    }
}

/// Sorted multi-map of request parameters
///
/// Keys iterate in byte order, so encoding is independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, Vec<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any existing values for `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Display) {
        self.values.insert(key.into(), vec![value.to_string()]);
    }

    /// Add another value for `key`, encoded as a repeated `key=v1&key=v2`
    pub fn append(&mut self, key: impl Into<String>, value: impl Display) {
        self.values
            .entry(key.into())
            .or_default()
            .push(value.to_string());
    }

    /// Store a list as a single JSON array literal, e.g. `symbols=["BTCUSDT","ETHUSDT"]`
    pub fn set_json_array<S: AsRef<str>>(&mut self, key: impl Into<String>, items: &[S]) {
        let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
        // a Vec<&str> always serializes
        let literal = serde_json::to_string(&items).unwrap_or_default();
        self.values.insert(key.into(), vec![literal]);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Flattened `(key, value)` pairs in encoding order
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.values
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
            .collect()
    }

    /// `application/x-www-form-urlencoded` encoding with sorted keys
    pub fn encode(&self) -> Result<String, ExchangeError> {
        serde_urlencoded::to_string(self.pairs())
            .map_err(|e| ExchangeError::Validation(format!("Failed to encode parameters: {}", e)))
    }
}

/// One endpoint call under construction
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub security: SecurityType,
    pub query: Params,
    pub form: Params,
    pub headers: Vec<(String, String)>,
    pub recv_window: Option<u64>,
}

impl Request {
    pub fn new(method: Method, endpoint: impl Into<String>, security: SecurityType) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            security,
            query: Params::new(),
            form: Params::new(),
            headers: Vec::new(),
            recv_window: None,
        }
    }

    pub fn get(endpoint: impl Into<String>, security: SecurityType) -> Self {
        Self::new(Method::GET, endpoint, security)
    }

    pub fn post(endpoint: impl Into<String>, security: SecurityType) -> Self {
        Self::new(Method::POST, endpoint, security)
    }

    pub fn put(endpoint: impl Into<String>, security: SecurityType) -> Self {
        Self::new(Method::PUT, endpoint, security)
    }

    pub fn delete(endpoint: impl Into<String>, security: SecurityType) -> Self {
        Self::new(Method::DELETE, endpoint, security)
    }

    pub fn set_query(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        self.query.set(key, value);
        self
    }

    pub fn set_form(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        self.form.set(key, value);
        self
    }

    /// Place a parameter by method convention: query for GET, form body otherwise
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        if self.method == Method::GET {
            self.query.set(key, value);
        } else {
            self.form.set(key, value);
        }
        self
    }

    /// Same placement as [`Self::set_param`], skipping `None`
    pub fn set_opt<V: Display>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.set_param(key, value);
        }
        self
    }

    pub fn append_param(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        if self.method == Method::GET {
            self.query.append(key, value);
        } else {
            self.form.append(key, value);
        }
        self
    }

    pub fn set_json_array<S: AsRef<str>>(&mut self, key: impl Into<String>, items: &[S]) -> &mut Self {
        if self.method == Method::GET {
            self.query.set_json_array(key, items);
        } else {
            self.form.set_json_array(key, items);
        }
        self
    }

    /// Set a header, replacing any previous value with the same (case-insensitive) name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.endpoint.trim().is_empty() {
            return Err(ExchangeError::Validation(
                "request endpoint is empty".to_string(),
            ));
        }
        if !self.endpoint.starts_with('/') {
            return Err(ExchangeError::Validation(format!(
                "request endpoint must start with '/': {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}

/// Mutator applied to a [`Request`] after the service has filled it in
#[derive(Clone)]
pub struct RequestOption(Arc<dyn Fn(&mut Request) + Send + Sync>);

impl RequestOption {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Request) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Override the server-side freshness window, in milliseconds
    pub fn recv_window(recv_window_ms: u64) -> Self {
        Self::new(move |req| req.recv_window = Some(recv_window_ms))
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        Self::new(move |req| {
            req.set_header(name.clone(), value.clone());
        })
    }

    /// Add a parameter the service does not expose a setter for
    pub fn param(key: impl Into<String>, value: impl Display) -> Self {
        let key = key.into();
        let value = value.to_string();
        Self::new(move |req| {
            req.set_param(key.clone(), &value);
        })
    }

    pub fn apply(&self, request: &mut Request) {
        (self.0)(request);
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestOption")
    }
}

/// Fully canonicalized request, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Query string as sent, including `signature` on signed requests
    pub query_string: String,
    /// Encoded form body, empty when there is none
    pub form_string: String,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_sorted() {
        let mut a = Params::new();
        a.set("symbol", "LTCBTC");
        a.set("side", "BUY");
        a.set("limit", 10);

        let mut b = Params::new();
        b.set("limit", 10);
        b.set("side", "BUY");
        b.set("symbol", "LTCBTC");

        assert_eq!(a.encode().unwrap(), "limit=10&side=BUY&symbol=LTCBTC");
        assert_eq!(a.encode().unwrap(), b.encode().unwrap());
    }

    #[test]
    fn test_value_stringification() {
        let mut params = Params::new();
        params.set("flag", true);
        params.set("tiny", 0.000_000_1_f64);
        params.set("qty", rust_decimal::Decimal::new(1200, 2));
        assert_eq!(params.get("flag"), Some("true"));
        assert_eq!(params.get("tiny"), Some("0.0000001"));
        assert_eq!(params.get("qty"), Some("12.00"));
    }

    #[test]
    fn test_json_array_and_append() {
        let mut params = Params::new();
        params.set_json_array("symbols", &["BTCUSDT", "ETHUSDT"]);
        assert_eq!(params.get("symbols"), Some(r#"["BTCUSDT","ETHUSDT"]"#));
        assert_eq!(
            params.encode().unwrap(),
            "symbols=%5B%22BTCUSDT%22%2C%22ETHUSDT%22%5D"
        );

        let mut params = Params::new();
        params.append("asset", "BTC");
        params.append("asset", "ETH");
        assert_eq!(params.encode().unwrap(), "asset=BTC&asset=ETH");
        assert_eq!(params.get_all("asset").len(), 2);
    }

    #[test]
    fn test_set_replaces() {
        let mut params = Params::new();
        params.append("k", 1);
        params.append("k", 2);
        params.set("k", 3);
        assert_eq!(params.encode().unwrap(), "k=3");
    }

    #[test]
    fn test_param_placement_follows_method() {
        let mut get = Request::get("/api/v3/depth", SecurityType::None);
        get.set_param("symbol", "BTCUSDT");
        assert!(get.query.contains("symbol"));
        assert!(get.form.is_empty());

        let mut post = Request::post("/api/v3/order", SecurityType::Signed);
        post.set_param("symbol", "BTCUSDT").set_opt::<u64>("orderId", None);
        assert!(post.form.contains("symbol"));
        assert!(!post.form.contains("orderId"));
        assert!(post.query.is_empty());
    }

    #[test]
    fn test_append_param_repeats_key() {
        let mut get = Request::get("/api/v3/allOrders", SecurityType::Signed);
        get.append_param("symbol", "BTCUSDT")
            .append_param("symbol", "ETHUSDT");
        assert_eq!(get.query.encode().unwrap(), "symbol=BTCUSDT&symbol=ETHUSDT");
        assert!(get.form.is_empty());

        let mut delete = Request::delete("/api/v3/openOrders", SecurityType::Signed);
        delete.append_param("orderId", 2).append_param("orderId", 1);
        assert_eq!(delete.form.encode().unwrap(), "orderId=2&orderId=1");
        assert!(delete.query.is_empty());
    }

    #[test]
    fn test_validation() {
        assert!(Request::get("", SecurityType::None).validate().is_err());
        assert!(Request::get("api/v3/ping", SecurityType::None).validate().is_err());
        assert!(Request::get("/api/v3/ping", SecurityType::None).validate().is_ok());
    }

    #[test]
    fn test_options_mutate_request() {
        let mut req = Request::get("/api/v3/account", SecurityType::Signed);
        RequestOption::recv_window(5000).apply(&mut req);
        RequestOption::header("X-Trace", "abc").apply(&mut req);
        RequestOption::header("x-trace", "def").apply(&mut req);
        RequestOption::param("omitZeroBalances", true).apply(&mut req);

        assert_eq!(req.recv_window, Some(5000));
        assert_eq!(req.headers, vec![("x-trace".to_string(), "def".to_string())]);
        assert_eq!(req.query.get("omitZeroBalances"), Some("true"));
    }
}
