use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use crate::core::types::{
    NewOrderRespType, OrderStatusType, OrderType, SelfTradePreventionMode, SideType,
    TimeInForceType,
};
use rust_decimal::Decimal;
use serde::Deserialize;

impl Client {
    pub fn create_order(
        &self,
        symbol: impl Into<String>,
        side: SideType,
        order_type: OrderType,
    ) -> CreateOrderService<'_> {
        CreateOrderService {
            client: self,
            symbol: symbol.into(),
            side,
            order_type,
            time_in_force: None,
            quantity: None,
            quote_order_qty: None,
            price: None,
            new_client_order_id: None,
            stop_price: None,
            trailing_delta: None,
            iceberg_qty: None,
            new_order_resp_type: None,
            self_trade_prevention_mode: None,
            test: false,
        }
    }

    pub fn get_order(&self, symbol: impl Into<String>) -> GetOrderService<'_> {
        GetOrderService {
            client: self,
            symbol: symbol.into(),
            order_id: None,
            orig_client_order_id: None,
        }
    }

    pub fn cancel_order(&self, symbol: impl Into<String>) -> CancelOrderService<'_> {
        CancelOrderService {
            client: self,
            symbol: symbol.into(),
            order_id: None,
            orig_client_order_id: None,
            new_client_order_id: None,
        }
    }

    pub fn list_open_orders(&self) -> ListOpenOrdersService<'_> {
        ListOpenOrdersService {
            client: self,
            symbol: None,
        }
    }

    pub fn cancel_open_orders(&self, symbol: impl Into<String>) -> CancelOpenOrdersService<'_> {
        CancelOpenOrdersService {
            client: self,
            symbol: symbol.into(),
        }
    }

    pub fn list_orders(&self, symbol: impl Into<String>) -> ListOrdersService<'_> {
        ListOrdersService {
            client: self,
            symbol: symbol.into(),
            order_id: None,
            start_time: None,
            end_time: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub price: String,
    pub qty: String,
    pub commission: String,
    pub commission_asset: String,
    #[serde(default)]
    pub trade_id: i64,
}

/// Acknowledgement of a new order; fields beyond the ids depend on `newOrderRespType`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderResponse {
    pub symbol: String,
    pub order_id: i64,
    pub order_list_id: i64,
    pub client_order_id: String,
    pub transact_time: i64,
    pub price: String,
    pub orig_qty: String,
    pub executed_qty: String,
    pub cummulative_quote_qty: String,
    pub status: Option<OrderStatusType>,
    pub time_in_force: Option<TimeInForceType>,
    #[serde(rename = "type")]
    pub order_type: Option<OrderType>,
    pub side: Option<SideType>,
    pub fills: Vec<Fill>,
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
}

/// `POST /api/v3/order`, or `/api/v3/order/test` after [`Self::test`]
#[derive(Debug)]
pub struct CreateOrderService<'a> {
    client: &'a Client,
    symbol: String,
    side: SideType,
    order_type: OrderType,
    time_in_force: Option<TimeInForceType>,
    quantity: Option<Decimal>,
    quote_order_qty: Option<Decimal>,
    price: Option<Decimal>,
    new_client_order_id: Option<String>,
    stop_price: Option<Decimal>,
    trailing_delta: Option<i64>,
    iceberg_qty: Option<Decimal>,
    new_order_resp_type: Option<NewOrderRespType>,
    self_trade_prevention_mode: Option<SelfTradePreventionMode>,
    test: bool,
}

impl CreateOrderService<'_> {
    pub fn time_in_force(mut self, time_in_force: TimeInForceType) -> Self {
        self.time_in_force = Some(time_in_force);
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

    pub fn new_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(id.into());
        self
    }

    pub fn stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    pub fn trailing_delta(mut self, trailing_delta: i64) -> Self {
        self.trailing_delta = Some(trailing_delta);
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

    pub fn self_trade_prevention_mode(mut self, mode: SelfTradePreventionMode) -> Self {
        self.self_trade_prevention_mode = Some(mode);
        self
    }

    /// Validate against the matching engine without placing the order
    pub fn test(mut self) -> Self {
        self.test = true;
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<CreateOrderResponse, ExchangeError> {
        let endpoint = if self.test {
            "/api/v3/order/test"
        } else {
            "/api/v3/order"
        };
        let mut request = Request::post(endpoint, SecurityType::Signed);
        request
            .set_param("symbol", &self.symbol)
            .set_param("side", self.side.wire()?)
            .set_param("type", self.order_type.wire()?)
            .set_opt("quantity", self.quantity)
            .set_opt("quoteOrderQty", self.quote_order_qty)
            .set_opt("price", self.price)
            .set_opt("newClientOrderId", self.new_client_order_id.as_deref())
            .set_opt("stopPrice", self.stop_price)
            .set_opt("trailingDelta", self.trailing_delta)
            .set_opt("icebergQty", self.iceberg_qty);
        if let Some(tif) = &self.time_in_force {
            request.set_param("timeInForce", tif.wire()?);
        }
        if let Some(resp_type) = &self.new_order_resp_type {
            request.set_param("newOrderRespType", resp_type.wire()?);
        }
        if let Some(mode) = &self.self_trade_prevention_mode {
            request.set_param("selfTradePreventionMode", mode.wire()?);
        }
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub symbol: String,
    pub order_id: i64,
    #[serde(default)]
    pub order_list_id: i64,
    pub client_order_id: String,
    pub price: String,
    pub orig_qty: String,
    pub executed_qty: String,
    pub cummulative_quote_qty: String,
    pub status: OrderStatusType,
    pub time_in_force: TimeInForceType,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: SideType,
    #[serde(default)]
    pub stop_price: String,
    #[serde(default)]
    pub iceberg_qty: String,
    pub time: i64,
    pub update_time: i64,
    pub is_working: bool,
    #[serde(default)]
    pub orig_quote_order_qty: String,
    #[serde(default)]
    pub self_trade_prevention_mode: Option<SelfTradePreventionMode>,
}

fn require_order_ref(
    order_id: Option<i64>,
    orig_client_order_id: Option<&str>,
) -> Result<(), ExchangeError> {
    if order_id.is_none() && orig_client_order_id.is_none() {
        return Err(ExchangeError::Validation(
            "either orderId or origClientOrderId must be set".to_string(),
        ));
    }
    Ok(())
}

/// `GET /api/v3/order`
#[derive(Debug)]
pub struct GetOrderService<'a> {
    client: &'a Client,
    symbol: String,
    order_id: Option<i64>,
    orig_client_order_id: Option<String>,
}

impl GetOrderService<'_> {
    pub fn order_id(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn orig_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.orig_client_order_id = Some(id.into());
        self
    }

    pub async fn send(self, ctx: &Context, opts: &[RequestOption]) -> Result<Order, ExchangeError> {
        require_order_ref(self.order_id, self.orig_client_order_id.as_deref())?;
        let mut request = Request::get("/api/v3/order", SecurityType::Signed);
        request
            .set_param("symbol", &self.symbol)
            .set_opt("orderId", self.order_id)
            .set_opt("origClientOrderId", self.orig_client_order_id.as_deref());
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelOrderResponse {
    pub symbol: String,
    pub orig_client_order_id: String,
    pub order_id: i64,
    pub order_list_id: i64,
    pub client_order_id: String,
    pub transact_time: i64,
    pub price: String,
    pub orig_qty: String,
    pub executed_qty: String,
    pub cummulative_quote_qty: String,
    pub status: Option<OrderStatusType>,
    pub time_in_force: Option<TimeInForceType>,
    #[serde(rename = "type")]
    pub order_type: Option<OrderType>,
    pub side: Option<SideType>,
}

/// `DELETE /api/v3/order`
#[derive(Debug)]
pub struct CancelOrderService<'a> {
    client: &'a Client,
    symbol: String,
    order_id: Option<i64>,
    orig_client_order_id: Option<String>,
    new_client_order_id: Option<String>,
}

impl CancelOrderService<'_> {
    pub fn order_id(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn orig_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.orig_client_order_id = Some(id.into());
        self
    }

    pub fn new_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(id.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<CancelOrderResponse, ExchangeError> {
        require_order_ref(self.order_id, self.orig_client_order_id.as_deref())?;
        let mut request = Request::delete("/api/v3/order", SecurityType::Signed);
        request
            .set_param("symbol", &self.symbol)
            .set_opt("orderId", self.order_id)
            .set_opt("origClientOrderId", self.orig_client_order_id.as_deref())
            .set_opt("newClientOrderId", self.new_client_order_id.as_deref());
        self.client.call_json(ctx, request, opts).await
    }
}

/// `GET /api/v3/openOrders`; every symbol when none is set
#[derive(Debug)]
pub struct ListOpenOrdersService<'a> {
    client: &'a Client,
    symbol: Option<String>,
}

impl ListOpenOrdersService<'_> {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<Order>, ExchangeError> {
        let mut request = Request::get("/api/v3/openOrders", SecurityType::Signed);
        request.set_opt("symbol", self.symbol.as_deref());
        self.client.call_json(ctx, request, opts).await
    }
}

/// `DELETE /api/v3/openOrders`
#[derive(Debug)]
pub struct CancelOpenOrdersService<'a> {
    client: &'a Client,
    symbol: String,
}

impl CancelOpenOrdersService<'_> {
    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<CancelOrderResponse>, ExchangeError> {
        let mut request = Request::delete("/api/v3/openOrders", SecurityType::Signed);
        request.set_param("symbol", &self.symbol);
        self.client.call_json(ctx, request, opts).await
    }
}

/// `GET /api/v3/allOrders`
#[derive(Debug)]
pub struct ListOrdersService<'a> {
    client: &'a Client,
    symbol: String,
    order_id: Option<i64>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: Option<u32>,
}

impl ListOrdersService<'_> {
    pub fn order_id(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn end_time(mut self, end_time: i64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<Order>, ExchangeError> {
        let mut request = Request::get("/api/v3/allOrders", SecurityType::Signed);
        request
            .set_param("symbol", &self.symbol)
            .set_opt("orderId", self.order_id)
            .set_opt("startTime", self.start_time)
            .set_opt("endTime", self.end_time)
            .set_opt("limit", self.limit);
        self.client.call_json(ctx, request, opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_order_response_decode() {
        let body = r#"{
            "symbol": "BTCUSDT", "orderId": 28, "orderListId": -1,
            "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP", "transactTime": 1507725176595,
            "price": "0.00000000", "origQty": "10.00000000", "executedQty": "10.00000000",
            "cummulativeQuoteQty": "10.00000000", "status": "FILLED", "timeInForce": "GTC",
            "type": "MARKET", "side": "SELL", "workingTime": 1507725176595,
            "selfTradePreventionMode": "NONE",
            "fills": [{"price": "4000.00000000", "qty": "1.00000000", "commission": "4.00000000",
                       "commissionAsset": "USDT", "tradeId": 56}]
        }"#;
        let resp: CreateOrderResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.order_id, 28);
        assert_eq!(resp.status, Some(OrderStatusType::Filled));
        assert_eq!(resp.order_type, Some(OrderType::Market));
        assert_eq!(resp.fills[0].trade_id, 56);
    }

    #[test]
    fn test_test_order_response_is_empty() {
        let resp: CreateOrderResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp, CreateOrderResponse::default());
    }

    #[test]
    fn test_order_reference_required() {
        assert!(require_order_ref(None, None).is_err());
        assert!(require_order_ref(Some(1), None).is_ok());
        assert!(require_order_ref(None, Some("abc")).is_ok());
    }
}
