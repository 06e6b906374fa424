//! Convert: request a quote, accept it, then poll the resulting order.

use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use rust_decimal::Decimal;
use serde::Deserialize;

impl Client {
    pub fn convert_get_quote(
        &self,
        from_asset: impl Into<String>,
        to_asset: impl Into<String>,
    ) -> ConvertGetQuoteService<'_> {
        ConvertGetQuoteService {
            client: self,
            from_asset: from_asset.into(),
            to_asset: to_asset.into(),
            from_amount: None,
            to_amount: None,
            wallet_type: None,
            valid_time: None,
        }
    }

    pub fn convert_accept_quote(&self, quote_id: impl Into<String>) -> ConvertAcceptQuoteService<'_> {
        ConvertAcceptQuoteService {
            client: self,
            quote_id: quote_id.into(),
        }
    }

    pub fn convert_order_status(&self) -> ConvertOrderStatusService<'_> {
        ConvertOrderStatusService {
            client: self,
            order_id: None,
            quote_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertQuote {
    pub quote_id: String,
    pub ratio: String,
    pub inverse_ratio: String,
    pub valid_timestamp: i64,
    pub to_amount: String,
    pub from_amount: String,
}

/// `POST /sapi/v1/convert/getQuote`
#[derive(Debug)]
pub struct ConvertGetQuoteService<'a> {
    client: &'a Client,
    from_asset: String,
    to_asset: String,
    from_amount: Option<Decimal>,
    to_amount: Option<Decimal>,
    wallet_type: Option<String>,
    valid_time: Option<String>,
}

impl ConvertGetQuoteService<'_> {
    /// Amount to spend; mutually exclusive with [`Self::to_amount`]
    pub fn from_amount(mut self, amount: Decimal) -> Self {
        self.from_amount = Some(amount);
        self
    }

    pub fn to_amount(mut self, amount: Decimal) -> Self {
        self.to_amount = Some(amount);
        self
    }

    /// `SPOT` or `FUNDING`
    pub fn wallet_type(mut self, wallet_type: impl Into<String>) -> Self {
        self.wallet_type = Some(wallet_type.into());
        self
    }

    /// Quote lifetime: `10s`, `30s`, `1m` or `2m`
    pub fn valid_time(mut self, valid_time: impl Into<String>) -> Self {
        self.valid_time = Some(valid_time.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<ConvertQuote, ExchangeError> {
        if self.from_amount.is_some() == self.to_amount.is_some() {
            return Err(ExchangeError::Validation(
                "exactly one of fromAmount and toAmount must be set".to_string(),
            ));
        }
        let mut request = Request::post("/sapi/v1/convert/getQuote", SecurityType::Signed);
        request
            .set_param("fromAsset", &self.from_asset)
            .set_param("toAsset", &self.to_asset)
            .set_opt("fromAmount", self.from_amount)
            .set_opt("toAmount", self.to_amount)
            .set_opt("walletType", self.wallet_type.as_deref())
            .set_opt("validTime", self.valid_time.as_deref());
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertAcceptQuoteResponse {
    pub order_id: String,
    pub create_time: i64,
    pub order_status: String,
}

/// `POST /sapi/v1/convert/acceptQuote`
#[derive(Debug)]
pub struct ConvertAcceptQuoteService<'a> {
    client: &'a Client,
    quote_id: String,
}

impl ConvertAcceptQuoteService<'_> {
    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<ConvertAcceptQuoteResponse, ExchangeError> {
        let mut request = Request::post("/sapi/v1/convert/acceptQuote", SecurityType::Signed);
        request.set_param("quoteId", &self.quote_id);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOrder {
    pub order_id: i64,
    /// `PROCESS`, `ACCEPT_SUCCESS`, `SUCCESS` or `FAIL`
    pub order_status: String,
    pub from_asset: String,
    pub from_amount: String,
    pub to_asset: String,
    pub to_amount: String,
    pub ratio: String,
    pub inverse_ratio: String,
    pub create_time: i64,
}

/// `GET /sapi/v1/convert/orderStatus`, by order id or quote id
#[derive(Debug)]
pub struct ConvertOrderStatusService<'a> {
    client: &'a Client,
    order_id: Option<String>,
    quote_id: Option<String>,
}

impl ConvertOrderStatusService<'_> {
    pub fn order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn quote_id(mut self, quote_id: impl Into<String>) -> Self {
        self.quote_id = Some(quote_id.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<ConvertOrder, ExchangeError> {
        if self.order_id.is_none() && self.quote_id.is_none() {
            return Err(ExchangeError::Validation(
                "either orderId or quoteId must be set".to_string(),
            ));
        }
        let mut request = Request::get("/sapi/v1/convert/orderStatus", SecurityType::Signed);
        request
            .set_opt("orderId", self.order_id.as_deref())
            .set_opt("quoteId", self.quote_id.as_deref());
        self.client.call_json(ctx, request, opts).await
    }
}
