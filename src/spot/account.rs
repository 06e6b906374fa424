use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use crate::core::types::{AccountType, RateLimitInterval, RateLimitType};
use serde::Deserialize;

impl Client {
    pub fn get_account(&self) -> GetAccountService<'_> {
        GetAccountService {
            client: self,
            omit_zero_balances: None,
        }
    }

    pub fn list_trades(&self, symbol: impl Into<String>) -> ListTradesService<'_> {
        ListTradesService {
            client: self,
            symbol: symbol.into(),
            order_id: None,
            start_time: None,
            end_time: None,
            from_id: None,
            limit: None,
        }
    }

    pub fn rate_limit_order_count(&self) -> RateLimitOrderCountService<'_> {
        RateLimitOrderCountService { client: self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommissionRates {
    pub maker: String,
    pub taker: String,
    pub buyer: String,
    pub seller: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub maker_commission: i64,
    pub taker_commission: i64,
    pub buyer_commission: i64,
    pub seller_commission: i64,
    #[serde(default)]
    pub commission_rates: Option<CommissionRates>,
    pub can_trade: bool,
    pub can_withdraw: bool,
    pub can_deposit: bool,
    #[serde(default)]
    pub brokered: bool,
    #[serde(default)]
    pub require_self_trade_prevention: bool,
    pub update_time: i64,
    pub account_type: AccountType,
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub permissions: Vec<AccountType>,
    #[serde(default)]
    pub uid: i64,
}

impl Account {
    pub fn balance(&self, asset: &str) -> Option<&Balance> {
        self.balances.iter().find(|b| b.asset == asset)
    }
}

/// `GET /api/v3/account`
#[derive(Debug)]
pub struct GetAccountService<'a> {
    client: &'a Client,
    omit_zero_balances: Option<bool>,
}

impl GetAccountService<'_> {
    pub fn omit_zero_balances(mut self, omit: bool) -> Self {
        self.omit_zero_balances = Some(omit);
        self
    }

    pub async fn send(self, ctx: &Context, opts: &[RequestOption]) -> Result<Account, ExchangeError> {
        let mut request = Request::get("/api/v3/account", SecurityType::Signed);
        request.set_opt("omitZeroBalances", self.omit_zero_balances);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTrade {
    pub symbol: String,
    pub id: i64,
    pub order_id: i64,
    #[serde(default)]
    pub order_list_id: i64,
    pub price: String,
    pub qty: String,
    pub quote_qty: String,
    pub commission: String,
    pub commission_asset: String,
    pub time: i64,
    pub is_buyer: bool,
    pub is_maker: bool,
    pub is_best_match: bool,
}

/// `GET /api/v3/myTrades`
#[derive(Debug)]
pub struct ListTradesService<'a> {
    client: &'a Client,
    symbol: String,
    order_id: Option<i64>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    from_id: Option<i64>,
    limit: Option<u32>,
}

impl ListTradesService<'_> {
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

    pub fn from_id(mut self, from_id: i64) -> Self {
        self.from_id = Some(from_id);
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
    ) -> Result<Vec<AccountTrade>, ExchangeError> {
        let mut request = Request::get("/api/v3/myTrades", SecurityType::Signed);
        request
            .set_param("symbol", &self.symbol)
            .set_opt("orderId", self.order_id)
            .set_opt("startTime", self.start_time)
            .set_opt("endTime", self.end_time)
            .set_opt("fromId", self.from_id)
            .set_opt("limit", self.limit);
        self.client.call_json(ctx, request, opts).await
    }
}

/// Current order-rate usage for one limit window
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitCount {
    pub rate_limit_type: RateLimitType,
    pub interval: RateLimitInterval,
    pub interval_num: i64,
    pub limit: i64,
    pub count: i64,
}

/// `GET /api/v3/rateLimit/order`
#[derive(Debug)]
pub struct RateLimitOrderCountService<'a> {
    client: &'a Client,
}

impl RateLimitOrderCountService<'_> {
    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<RateLimitCount>, ExchangeError> {
        let request = Request::get("/api/v3/rateLimit/order", SecurityType::Signed);
        self.client.call_json(ctx, request, opts).await
    }
}
