//! Async REST client core for Binance-style spot exchanges.
//!
//! A [`Client`] owns credentials, the server time offset and an
//! [`HttpTransport`]. Endpoints are small service structs created from the
//! client, configured with fluent setters and executed with `send`:
//!
//! ```rust,no_run
//! use binance_rest::{Client, ClientConfig, Context};
//!
//! # async fn example() -> Result<(), binance_rest::ExchangeError> {
//! let client = Client::new(ClientConfig::read_only())?;
//! let ctx = Context::background();
//!
//! client.ping().send(&ctx, &[]).await?;
//! let depth = client.depth("BTCUSDT").limit(5).send(&ctx, &[]).await?;
//! println!("best bid: {:?}", depth.bids.first());
//! # Ok(())
//! # }
//! ```
//!
//! Signed endpoints stamp `timestamp` from the local clock minus the offset
//! stored by [`spot::market_data::SetServerTimeService`].

pub mod core;
pub mod spot;

pub use crate::core::config::{ClientConfig, ConfigError};
pub use crate::core::errors::{ApiError, ApiErrorEnvelope, ExchangeError, INVALID_API_CODE};
pub use crate::core::kernel::{
    CancelHandle, Client, ClientBuilder, Clock, Context, HttpResponse, HttpTransport, KeyType,
    Params, PreparedRequest, ReqwestTransport, Request, RequestOption, SecurityType, Signer,
    SystemClock, API_KEY_HEADER,
};
pub use crate::core::types::*;
