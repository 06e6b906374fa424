//! Transport kernel shared by every endpoint service.
//!
//! - [`signer`]: HMAC, RSA and Ed25519 request signatures
//! - [`request`]: the request model, parameters and per-call options
//! - [`context`]: cancellation and deadlines
//! - [`transport`]: the pluggable HTTP round-tripper
//! - [`rest`]: the [`Client`] that canonicalizes, signs and dispatches
//!
//! The kernel knows nothing about individual endpoints; those live in
//! [`crate::spot`] and reach the network only through [`Client::call_api`].

pub mod context;
pub mod request;
pub mod rest;
pub mod signer;
pub mod transport;

pub use context::{CancelHandle, Context};
pub use request::{Params, PreparedRequest, Request, RequestOption, SecurityType};
pub use rest::{Client, ClientBuilder, Clock, SystemClock, API_KEY_HEADER};
pub use signer::{Ed25519Signer, HmacSigner, KeyType, RsaSigner, Signer};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
