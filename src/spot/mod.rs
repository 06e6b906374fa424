//! Spot and SAPI endpoint services.
//!
//! Each service borrows a [`Client`](crate::Client), takes its mandatory
//! parameters in the factory method and its optional ones through fluent
//! setters, and is executed with `send(ctx, opts)`.

pub mod account;
pub mod convert;
pub mod exchange_info;
pub mod loan;
pub mod margin;
pub mod market_data;
pub mod savings;
pub mod trading;
pub mod user_stream;
pub mod wallet;

use serde::Deserialize;

/// Ticker endpoints answer with an object for one symbol and an array otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Response carrying only a transfer id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub tran_id: i64,
}
