//! Public market data endpoints and server time synchronization.

use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use crate::core::types::{AccountType, KlineInterval};
use crate::spot::exchange_info::ExchangeInfo;
use crate::spot::OneOrMany;
use serde::Deserialize;
use tracing::debug;

impl Client {
    pub fn ping(&self) -> PingService<'_> {
        PingService { client: self }
    }

    pub fn server_time(&self) -> ServerTimeService<'_> {
        ServerTimeService { client: self }
    }

    pub fn set_server_time(&self) -> SetServerTimeService<'_> {
        SetServerTimeService { client: self }
    }

    pub fn exchange_info(&self) -> ExchangeInfoService<'_> {
        ExchangeInfoService {
            client: self,
            symbol: None,
            symbols: Vec::new(),
            permissions: Vec::new(),
        }
    }

    pub fn depth(&self, symbol: impl Into<String>) -> DepthService<'_> {
        DepthService {
            client: self,
            symbol: symbol.into(),
            limit: None,
        }
    }

    pub fn recent_trades(&self, symbol: impl Into<String>) -> RecentTradesService<'_> {
        RecentTradesService {
            client: self,
            symbol: symbol.into(),
            limit: None,
        }
    }

    pub fn historical_trades(&self, symbol: impl Into<String>) -> HistoricalTradesService<'_> {
        HistoricalTradesService {
            client: self,
            symbol: symbol.into(),
            limit: None,
            from_id: None,
        }
    }

    pub fn agg_trades(&self, symbol: impl Into<String>) -> AggTradesService<'_> {
        AggTradesService {
            client: self,
            symbol: symbol.into(),
            from_id: None,
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    pub fn klines(&self, symbol: impl Into<String>, interval: KlineInterval) -> KlinesService<'_> {
        KlinesService {
            client: self,
            symbol: symbol.into(),
            interval,
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    pub fn average_price(&self, symbol: impl Into<String>) -> AveragePriceService<'_> {
        AveragePriceService {
            client: self,
            symbol: symbol.into(),
        }
    }

    pub fn list_prices(&self) -> ListPricesService<'_> {
        ListPricesService {
            client: self,
            symbol: None,
            symbols: Vec::new(),
        }
    }

    pub fn list_book_tickers(&self) -> ListBookTickersService<'_> {
        ListBookTickersService {
            client: self,
            symbol: None,
            symbols: Vec::new(),
        }
    }

    pub fn price_change_stats(&self) -> PriceChangeStatsService<'_> {
        PriceChangeStatsService {
            client: self,
            symbol: None,
            symbols: Vec::new(),
        }
    }
}

/// `GET /api/v3/ping`
#[derive(Debug)]
pub struct PingService<'a> {
    client: &'a Client,
}

impl PingService<'_> {
    pub async fn send(self, ctx: &Context, opts: &[RequestOption]) -> Result<(), ExchangeError> {
        let request = Request::get("/api/v3/ping", SecurityType::None);
        self.client.call_api(ctx, request, opts).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    pub server_time: i64,
}

/// `GET /api/v3/time`
#[derive(Debug)]
pub struct ServerTimeService<'a> {
    client: &'a Client,
}

impl ServerTimeService<'_> {
    /// Server time in milliseconds since the epoch
    pub async fn send(self, ctx: &Context, opts: &[RequestOption]) -> Result<i64, ExchangeError> {
        let request = Request::get("/api/v3/time", SecurityType::None);
        let time: ServerTime = self.client.call_json(ctx, request, opts).await?;
        Ok(time.server_time)
    }
}

/// Fetch the server time and store `local - server` as the client's time offset
///
/// No round-trip correction is applied.
#[derive(Debug)]
pub struct SetServerTimeService<'a> {
    client: &'a Client,
}

impl SetServerTimeService<'_> {
    /// Returns the stored offset in milliseconds
    pub async fn send(self, ctx: &Context, opts: &[RequestOption]) -> Result<i64, ExchangeError> {
        let server_time = ServerTimeService {
            client: self.client,
        }
        .send(ctx, opts)
        .await?;

        let offset = self.client.local_time_ms() - server_time;
        self.client.set_time_offset(offset);
        debug!(server_time, offset, "Synchronized server time");
        Ok(offset)
    }
}

/// `GET /api/v3/exchangeInfo`
#[derive(Debug)]
pub struct ExchangeInfoService<'a> {
    client: &'a Client,
    symbol: Option<String>,
    symbols: Vec<String>,
    permissions: Vec<AccountType>,
}

impl ExchangeInfoService<'_> {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn symbols<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub fn permissions(mut self, permissions: impl IntoIterator<Item = AccountType>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<ExchangeInfo, ExchangeError> {
        let mut request = Request::get("/api/v3/exchangeInfo", SecurityType::None);
        request.set_opt("symbol", self.symbol.as_deref());
        if !self.symbols.is_empty() {
            request.set_json_array("symbols", &self.symbols);
        }
        if !self.permissions.is_empty() {
            let permissions = self
                .permissions
                .iter()
                .map(AccountType::wire)
                .collect::<Result<Vec<_>, _>>()?;
            request.set_json_array("permissions", &permissions);
        }
        self.client.call_json(ctx, request, opts).await
    }
}

/// One `[price, quantity]` level of the order book
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String)")]
pub struct PriceLevel {
    pub price: String,
    pub quantity: String,
}

impl From<(String, String)> for PriceLevel {
    fn from((price, quantity): (String, String)) -> Self {
        Self { price, quantity }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthResponse {
    pub last_update_id: i64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// `GET /api/v3/depth`
#[derive(Debug)]
pub struct DepthService<'a> {
    client: &'a Client,
    symbol: String,
    limit: Option<u32>,
}

impl DepthService<'_> {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<DepthResponse, ExchangeError> {
        let mut request = Request::get("/api/v3/depth", SecurityType::None);
        request
            .set_param("symbol", &self.symbol)
            .set_opt("limit", self.limit);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: i64,
    pub price: String,
    pub qty: String,
    pub quote_qty: String,
    pub time: i64,
    pub is_buyer_maker: bool,
    pub is_best_match: bool,
}

/// `GET /api/v3/trades`
#[derive(Debug)]
pub struct RecentTradesService<'a> {
    client: &'a Client,
    symbol: String,
    limit: Option<u32>,
}

impl RecentTradesService<'_> {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<Trade>, ExchangeError> {
        let mut request = Request::get("/api/v3/trades", SecurityType::None);
        request
            .set_param("symbol", &self.symbol)
            .set_opt("limit", self.limit);
        self.client.call_json(ctx, request, opts).await
    }
}

/// `GET /api/v3/historicalTrades`, identified by API key
#[derive(Debug)]
pub struct HistoricalTradesService<'a> {
    client: &'a Client,
    symbol: String,
    limit: Option<u32>,
    from_id: Option<i64>,
}

impl HistoricalTradesService<'_> {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn from_id(mut self, from_id: i64) -> Self {
        self.from_id = Some(from_id);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<Trade>, ExchangeError> {
        let mut request = Request::get("/api/v3/historicalTrades", SecurityType::ApiKey);
        request
            .set_param("symbol", &self.symbol)
            .set_opt("limit", self.limit)
            .set_opt("fromId", self.from_id);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggTrade {
    #[serde(rename = "a")]
    pub agg_trade_id: i64,
    #[serde(rename = "p")]
    pub price: String,
    #[serde(rename = "q")]
    pub quantity: String,
    #[serde(rename = "f")]
    pub first_trade_id: i64,
    #[serde(rename = "l")]
    pub last_trade_id: i64,
    #[serde(rename = "T")]
    pub timestamp: i64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
    #[serde(rename = "M")]
    pub is_best_price_match: bool,
}

/// `GET /api/v3/aggTrades`
#[derive(Debug)]
pub struct AggTradesService<'a> {
    client: &'a Client,
    symbol: String,
    from_id: Option<i64>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: Option<u32>,
}

impl AggTradesService<'_> {
    pub fn from_id(mut self, from_id: i64) -> Self {
        self.from_id = Some(from_id);
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
    ) -> Result<Vec<AggTrade>, ExchangeError> {
        let mut request = Request::get("/api/v3/aggTrades", SecurityType::None);
        request
            .set_param("symbol", &self.symbol)
            .set_opt("fromId", self.from_id)
            .set_opt("startTime", self.start_time)
            .set_opt("endTime", self.end_time)
            .set_opt("limit", self.limit);
        self.client.call_json(ctx, request, opts).await
    }
}

type KlineRow = (
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    i64,
    String,
    String,
    serde_json::Value,
);

/// Candlestick, decoded from the exchange's positional array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "KlineRow")]
pub struct Kline {
    pub open_time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub close_time: i64,
    pub quote_asset_volume: String,
    pub trade_num: i64,
    pub taker_buy_base_asset_volume: String,
    pub taker_buy_quote_asset_volume: String,
}

impl From<KlineRow> for Kline {
    fn from(row: KlineRow) -> Self {
        Self {
            open_time: row.0,
            open: row.1,
            high: row.2,
            low: row.3,
            close: row.4,
            volume: row.5,
            close_time: row.6,
            quote_asset_volume: row.7,
            trade_num: row.8,
            taker_buy_base_asset_volume: row.9,
            taker_buy_quote_asset_volume: row.10,
        }
    }
}

/// `GET /api/v3/klines`
#[derive(Debug)]
pub struct KlinesService<'a> {
    client: &'a Client,
    symbol: String,
    interval: KlineInterval,
    start_time: Option<i64>,
    end_time: Option<i64>,
    limit: Option<u32>,
}

impl KlinesService<'_> {
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
    ) -> Result<Vec<Kline>, ExchangeError> {
        let mut request = Request::get("/api/v3/klines", SecurityType::None);
        request
            .set_param("symbol", &self.symbol)
            .set_param("interval", self.interval.wire()?)
            .set_opt("startTime", self.start_time)
            .set_opt("endTime", self.end_time)
            .set_opt("limit", self.limit);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AveragePrice {
    pub mins: i64,
    pub price: String,
    #[serde(default)]
    pub close_time: i64,
}

/// `GET /api/v3/avgPrice`
#[derive(Debug)]
pub struct AveragePriceService<'a> {
    client: &'a Client,
    symbol: String,
}

impl AveragePriceService<'_> {
    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<AveragePrice, ExchangeError> {
        let mut request = Request::get("/api/v3/avgPrice", SecurityType::None);
        request.set_param("symbol", &self.symbol);
        self.client.call_json(ctx, request, opts).await
    }
}

fn ticker_request(endpoint: &str, symbol: Option<&str>, symbols: &[String]) -> Request {
    let mut request = Request::get(endpoint, SecurityType::None);
    if let Some(symbol) = symbol {
        request.set_param("symbol", symbol);
    } else if !symbols.is_empty() {
        request.set_json_array("symbols", symbols);
    }
    request
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolPrice {
    pub symbol: String,
    pub price: String,
}

/// `GET /api/v3/ticker/price`; all symbols unless narrowed
#[derive(Debug)]
pub struct ListPricesService<'a> {
    client: &'a Client,
    symbol: Option<String>,
    symbols: Vec<String>,
}

impl ListPricesService<'_> {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn symbols<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<SymbolPrice>, ExchangeError> {
        let request = ticker_request("/api/v3/ticker/price", self.symbol.as_deref(), &self.symbols);
        let prices: OneOrMany<SymbolPrice> = self.client.call_json(ctx, request, opts).await?;
        Ok(prices.into_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicker {
    pub symbol: String,
    pub bid_price: String,
    pub bid_qty: String,
    pub ask_price: String,
    pub ask_qty: String,
}

/// `GET /api/v3/ticker/bookTicker`
#[derive(Debug)]
pub struct ListBookTickersService<'a> {
    client: &'a Client,
    symbol: Option<String>,
    symbols: Vec<String>,
}

impl ListBookTickersService<'_> {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn symbols<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<BookTicker>, ExchangeError> {
        let request = ticker_request(
            "/api/v3/ticker/bookTicker",
            self.symbol.as_deref(),
            &self.symbols,
        );
        let tickers: OneOrMany<BookTicker> = self.client.call_json(ctx, request, opts).await?;
        Ok(tickers.into_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChangeStats {
    pub symbol: String,
    pub price_change: String,
    pub price_change_percent: String,
    pub weighted_avg_price: String,
    #[serde(default)]
    pub prev_close_price: String,
    pub last_price: String,
    #[serde(default)]
    pub last_qty: String,
    #[serde(default)]
    pub bid_price: String,
    #[serde(default)]
    pub bid_qty: String,
    #[serde(default)]
    pub ask_price: String,
    #[serde(default)]
    pub ask_qty: String,
    pub open_price: String,
    pub high_price: String,
    pub low_price: String,
    pub volume: String,
    pub quote_volume: String,
    pub open_time: i64,
    pub close_time: i64,
    pub first_id: i64,
    pub last_id: i64,
    pub count: i64,
}

/// `GET /api/v3/ticker/24hr`
#[derive(Debug)]
pub struct PriceChangeStatsService<'a> {
    client: &'a Client,
    symbol: Option<String>,
    symbols: Vec<String>,
}

impl PriceChangeStatsService<'_> {
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn symbols<S: Into<String>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<PriceChangeStats>, ExchangeError> {
        let request = ticker_request("/api/v3/ticker/24hr", self.symbol.as_deref(), &self.symbols);
        let stats: OneOrMany<PriceChangeStats> = self.client.call_json(ctx, request, opts).await?;
        Ok(stats.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_levels_decode() {
        let depth: DepthResponse = serde_json::from_str(
            r#"{"lastUpdateId":1027024,"bids":[["4.00000000","431.00000000"]],"asks":[["4.00000200","12.00000000"]]}"#,
        )
        .unwrap();
        assert_eq!(depth.last_update_id, 1_027_024);
        assert_eq!(depth.bids[0].price, "4.00000000");
        assert_eq!(depth.asks[0].quantity, "12.00000000");
    }

    #[test]
    fn test_kline_row_decode() {
        let klines: Vec<Kline> = serde_json::from_str(
            r#"[[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]]"#,
        )
        .unwrap();
        assert_eq!(klines[0].open_time, 1_499_040_000_000);
        assert_eq!(klines[0].close, "0.01577100");
        assert_eq!(klines[0].trade_num, 308);
    }

    #[test]
    fn test_agg_trade_decode() {
        let trades: Vec<AggTrade> = serde_json::from_str(
            r#"[{"a":26129,"p":"0.01633102","q":"4.70443515","f":27781,"l":27781,"T":1498793709153,"m":true,"M":true}]"#,
        )
        .unwrap();
        assert_eq!(trades[0].agg_trade_id, 26129);
        assert!(trades[0].is_buyer_maker);
    }
}
