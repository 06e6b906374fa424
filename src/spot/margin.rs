//! Cross and isolated margin endpoints.

use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use crate::core::types::{
    MarginTransferType, NewOrderRespType, OrderType, SideEffectType, SideType, TimeInForceType,
};
use crate::spot::trading::CreateOrderResponse;
use crate::spot::TransactionResponse;
use rust_decimal::Decimal;
use serde::Deserialize;

impl Client {
    pub fn margin_transfer(
        &self,
        asset: impl Into<String>,
        amount: Decimal,
        transfer_type: MarginTransferType,
    ) -> MarginTransferService<'_> {
        MarginTransferService {
            client: self,
            asset: asset.into(),
            amount,
            transfer_type,
        }
    }

    pub fn margin_loan(&self, asset: impl Into<String>, amount: Decimal) -> MarginLoanService<'_> {
        MarginLoanService {
            client: self,
            asset: asset.into(),
            amount,
            isolated_symbol: None,
        }
    }

    pub fn margin_repay(&self, asset: impl Into<String>, amount: Decimal) -> MarginRepayService<'_> {
        MarginRepayService {
            client: self,
            asset: asset.into(),
            amount,
            isolated_symbol: None,
        }
    }

    pub fn create_margin_order(
        &self,
        symbol: impl Into<String>,
        side: SideType,
        order_type: OrderType,
    ) -> CreateMarginOrderService<'_> {
        CreateMarginOrderService {
            client: self,
            symbol: symbol.into(),
            side,
            order_type,
            is_isolated: None,
            quantity: None,
            quote_order_qty: None,
            price: None,
            stop_price: None,
            new_client_order_id: None,
            iceberg_qty: None,
            new_order_resp_type: None,
            side_effect_type: None,
            time_in_force: None,
        }
    }

    pub fn get_margin_account(&self) -> GetMarginAccountService<'_> {
        GetMarginAccountService { client: self }
    }
}

/// `POST /sapi/v1/margin/transfer`, between the spot and cross margin wallets
#[derive(Debug)]
pub struct MarginTransferService<'a> {
    client: &'a Client,
    asset: String,
    amount: Decimal,
    transfer_type: MarginTransferType,
}

impl MarginTransferService<'_> {
    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<TransactionResponse, ExchangeError> {
        let mut request = Request::post("/sapi/v1/margin/transfer", SecurityType::Signed);
        request
            .set_param("asset", &self.asset)
            .set_param("amount", self.amount)
            .set_param("type", self.transfer_type.wire()?);
        self.client.call_json(ctx, request, opts).await
    }
}

fn margin_borrow_request(
    endpoint: &str,
    asset: &str,
    amount: Decimal,
    isolated_symbol: Option<&str>,
) -> Request {
    let mut request = Request::post(endpoint, SecurityType::Signed);
    request.set_param("asset", asset).set_param("amount", amount);
    if let Some(symbol) = isolated_symbol {
        request
            .set_param("isIsolated", "TRUE")
            .set_param("symbol", symbol);
    }
    request
}

/// `POST /sapi/v1/margin/loan`
#[derive(Debug)]
pub struct MarginLoanService<'a> {
    client: &'a Client,
    asset: String,
    amount: Decimal,
    isolated_symbol: Option<String>,
}

impl MarginLoanService<'_> {
    /// Borrow on the isolated margin account of `symbol`
    pub fn isolated(mut self, symbol: impl Into<String>) -> Self {
        self.isolated_symbol = Some(symbol.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<TransactionResponse, ExchangeError> {
        let request = margin_borrow_request(
            "/sapi/v1/margin/loan",
            &self.asset,
            self.amount,
            self.isolated_symbol.as_deref(),
        );
        self.client.call_json(ctx, request, opts).await
    }
}

/// `POST /sapi/v1/margin/repay`
#[derive(Debug)]
pub struct MarginRepayService<'a> {
    client: &'a Client,
    asset: String,
    amount: Decimal,
    isolated_symbol: Option<String>,
}

impl MarginRepayService<'_> {
    pub fn isolated(mut self, symbol: impl Into<String>) -> Self {
        self.isolated_symbol = Some(symbol.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<TransactionResponse, ExchangeError> {
        let request = margin_borrow_request(
            "/sapi/v1/margin/repay",
            &self.asset,
            self.amount,
            self.isolated_symbol.as_deref(),
        );
        self.client.call_json(ctx, request, opts).await
    }
}

/// `POST /sapi/v1/margin/order`
#[derive(Debug)]
pub struct CreateMarginOrderService<'a> {
    client: &'a Client,
    symbol: String,
    side: SideType,
    order_type: OrderType,
    is_isolated: Option<bool>,
    quantity: Option<Decimal>,
    quote_order_qty: Option<Decimal>,
    price: Option<Decimal>,
    stop_price: Option<Decimal>,
    new_client_order_id: Option<String>,
    iceberg_qty: Option<Decimal>,
    new_order_resp_type: Option<NewOrderRespType>,
    side_effect_type: Option<SideEffectType>,
    time_in_force: Option<TimeInForceType>,
}

impl CreateMarginOrderService<'_> {
    pub fn is_isolated(mut self, is_isolated: bool) -> Self {
        self.is_isolated = Some(is_isolated);
        self
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn quote_order_qty(mut self, quote_order_qty: Decimal) -> Self {
        self.quote_order_qty = Some(quote_order_qty);
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    pub fn new_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(id.into());
        self
    }

    pub fn iceberg_qty(mut self, iceberg_qty: Decimal) -> Self {
        self.iceberg_qty = Some(iceberg_qty);
        self
    }

    pub fn new_order_resp_type(mut self, resp_type: NewOrderRespType) -> Self {
        self.new_order_resp_type = Some(resp_type);
        self
    }

    pub fn side_effect_type(mut self, side_effect: SideEffectType) -> Self {
        self.side_effect_type = Some(side_effect);
        self
    }

    pub fn time_in_force(mut self, time_in_force: TimeInForceType) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<CreateOrderResponse, ExchangeError> {
        let mut request = Request::post("/sapi/v1/margin/order", SecurityType::Signed);
        request
            .set_param("symbol", &self.symbol)
            .set_param("side", self.side.wire()?)
            .set_param("type", self.order_type.wire()?)
            .set_opt("isIsolated", self.is_isolated.map(|i| if i { "TRUE" } else { "FALSE" }))
            .set_opt("quantity", self.quantity)
            .set_opt("quoteOrderQty", self.quote_order_qty)
            .set_opt("price", self.price)
            .set_opt("stopPrice", self.stop_price)
            .set_opt("newClientOrderId", self.new_client_order_id.as_deref())
            .set_opt("icebergQty", self.iceberg_qty);
        if let Some(resp_type) = &self.new_order_resp_type {
            request.set_param("newOrderRespType", resp_type.wire()?);
        }
        if let Some(side_effect) = &self.side_effect_type {
            request.set_param("sideEffectType", side_effect.wire()?);
        }
        if let Some(tif) = &self.time_in_force {
            request.set_param("timeInForce", tif.wire()?);
        }
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAsset {
    pub asset: String,
    pub borrowed: String,
    pub free: String,
    pub interest: String,
    pub locked: String,
    pub net_asset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginAccount {
    pub borrow_enabled: bool,
    pub margin_level: String,
    pub total_asset_of_btc: String,
    pub total_liability_of_btc: String,
    pub total_net_asset_of_btc: String,
    pub trade_enabled: bool,
    pub transfer_enabled: bool,
    pub user_assets: Vec<UserAsset>,
}

/// `GET /sapi/v1/margin/account`
#[derive(Debug)]
pub struct GetMarginAccountService<'a> {
    client: &'a Client,
}

impl GetMarginAccountService<'_> {
    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<MarginAccount, ExchangeError> {
        let request = Request::get("/sapi/v1/margin/account", SecurityType::Signed);
        self.client.call_json(ctx, request, opts).await
    }
}
