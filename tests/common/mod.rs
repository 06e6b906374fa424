#![allow(dead_code)]

use async_trait::async_trait;
use binance_rest::{
    Client, ClientConfig, Clock, ExchangeError, HttpResponse, HttpTransport, PreparedRequest,
};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

pub const BASE_URL: &str = "https://api.test";

/// Clock pinned to a settable instant
#[derive(Debug, Default)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self(AtomicI64::new(now_ms))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Transport that records every request and replays canned responses
///
/// When the queue is empty it answers `200 {}`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<PreparedRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body.as_bytes().to_vec()));
    }

    pub fn respond_with(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> PreparedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn round_trip(&self, request: PreparedRequest) -> Result<HttpResponse, ExchangeError> {
        self.requests.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| HttpResponse::new(200, b"{}".to_vec())))
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new("k".to_string(), "s".to_string()).base_url(BASE_URL)
}

/// Client wired to a recording transport and a fixed clock
pub fn test_client(now_ms: i64) -> (Client, Arc<RecordingTransport>, Arc<FixedClock>) {
    client_with(test_config(), now_ms)
}

pub fn client_with(
    config: ClientConfig,
    now_ms: i64,
) -> (Client, Arc<RecordingTransport>, Arc<FixedClock>) {
    let transport = RecordingTransport::new();
    let clock = Arc::new(FixedClock::new(now_ms));
    let client = Client::builder(config)
        .with_transport(transport.clone())
        .with_clock(clock.clone())
        .build()
        .expect("client builds");
    (client, transport, clock)
}

/// In-memory sink for `tracing_subscriber::fmt` output
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Dispatcher writing every event at `DEBUG` and above into this buffer
    pub fn dispatch(&self) -> tracing::Dispatch {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::Dispatch::new(subscriber)
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Split a query string into `(key, value)` pairs, still percent-encoded
pub fn query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (k, v) = p.split_once('=').unwrap_or((p, ""));
            (k.to_string(), v.to_string())
        })
        .collect()
}
