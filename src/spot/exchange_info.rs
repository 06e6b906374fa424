use crate::core::types::{
    AccountType, OrderType, RateLimitInterval, RateLimitType, SymbolStatusType,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub server_time: i64,
    #[serde(default)]
    pub rate_limits: Vec<RateLimit>,
    #[serde(default)]
    pub exchange_filters: Vec<serde_json::Value>,
    pub symbols: Vec<Symbol>,
}

impl ExchangeInfo {
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.symbol == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub rate_limit_type: RateLimitType,
    pub interval: RateLimitInterval,
    pub interval_num: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub symbol: String,
    pub status: SymbolStatusType,
    pub base_asset: String,
    pub base_asset_precision: u32,
    pub quote_asset: String,
    #[serde(default)]
    pub quote_precision: u32,
    #[serde(default)]
    pub quote_asset_precision: u32,
    #[serde(default)]
    pub order_types: Vec<OrderType>,
    #[serde(default)]
    pub iceberg_allowed: bool,
    #[serde(default)]
    pub oco_allowed: bool,
    #[serde(default)]
    pub quote_order_qty_market_allowed: bool,
    #[serde(default)]
    pub is_spot_trading_allowed: bool,
    #[serde(default)]
    pub is_margin_trading_allowed: bool,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
    #[serde(default)]
    pub permissions: Vec<AccountType>,
}

/// Trading rule attached to a symbol, tagged by `filterType`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER")]
    Price(PriceFilter),
    #[serde(rename = "PERCENT_PRICE")]
    PercentPrice(PercentPriceFilter),
    #[serde(rename = "PERCENT_PRICE_BY_SIDE")]
    PercentPriceBySide(PercentPriceBySideFilter),
    #[serde(rename = "LOT_SIZE")]
    LotSize(LotSizeFilter),
    #[serde(rename = "MARKET_LOT_SIZE")]
    MarketLotSize(LotSizeFilter),
    #[serde(rename = "MIN_NOTIONAL")]
    MinNotional(MinNotionalFilter),
    #[serde(rename = "NOTIONAL")]
    Notional(NotionalFilter),
    #[serde(rename = "ICEBERG_PARTS")]
    IcebergParts(IcebergPartsFilter),
    #[serde(rename = "MAX_NUM_ORDERS")]
    MaxNumOrders(MaxNumOrdersFilter),
    #[serde(rename = "MAX_NUM_ALGO_ORDERS")]
    MaxNumAlgoOrders(MaxNumAlgoOrdersFilter),
    #[serde(rename = "TRAILING_DELTA")]
    TrailingDelta(TrailingDeltaFilter),
    /// Filter type this crate does not model
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilter {
    pub min_price: String,
    pub max_price: String,
    pub tick_size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentPriceFilter {
    pub multiplier_up: String,
    pub multiplier_down: String,
    #[serde(default)]
    pub avg_price_mins: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentPriceBySideFilter {
    pub bid_multiplier_up: String,
    pub bid_multiplier_down: String,
    pub ask_multiplier_up: String,
    pub ask_multiplier_down: String,
    #[serde(default)]
    pub avg_price_mins: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizeFilter {
    pub min_qty: String,
    pub max_qty: String,
    pub step_size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinNotionalFilter {
    pub min_notional: String,
    #[serde(default)]
    pub apply_to_market: bool,
    #[serde(default)]
    pub avg_price_mins: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotionalFilter {
    pub min_notional: String,
    #[serde(default)]
    pub apply_min_to_market: bool,
    #[serde(default)]
    pub max_notional: String,
    #[serde(default)]
    pub apply_max_to_market: bool,
    #[serde(default)]
    pub avg_price_mins: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcebergPartsFilter {
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxNumOrdersFilter {
    pub max_num_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxNumAlgoOrdersFilter {
    pub max_num_algo_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailingDeltaFilter {
    pub min_trailing_above_delta: i64,
    pub max_trailing_above_delta: i64,
    pub min_trailing_below_delta: i64,
    pub max_trailing_below_delta: i64,
}

macro_rules! filter_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Option<&$ty> {
            self.filters.iter().find_map(|f| match f {
                SymbolFilter::$variant(inner) => Some(inner),
                _ => None,
            })
        }
    };
}

impl Symbol {
    filter_accessor!(price_filter, Price, PriceFilter);
    filter_accessor!(percent_price_filter, PercentPrice, PercentPriceFilter);
    filter_accessor!(
        percent_price_by_side_filter,
        PercentPriceBySide,
        PercentPriceBySideFilter
    );
    filter_accessor!(lot_size_filter, LotSize, LotSizeFilter);
    filter_accessor!(market_lot_size_filter, MarketLotSize, LotSizeFilter);
    filter_accessor!(min_notional_filter, MinNotional, MinNotionalFilter);
    filter_accessor!(notional_filter, Notional, NotionalFilter);
    filter_accessor!(iceberg_parts_filter, IcebergParts, IcebergPartsFilter);
    filter_accessor!(max_num_orders_filter, MaxNumOrders, MaxNumOrdersFilter);
    filter_accessor!(
        max_num_algo_orders_filter,
        MaxNumAlgoOrders,
        MaxNumAlgoOrdersFilter
    );
    filter_accessor!(trailing_delta_filter, TrailingDelta, TrailingDeltaFilter);

    pub fn is_trading(&self) -> bool {
        self.status == SymbolStatusType::Trading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYMBOL: &str = r#"{
        "symbol": "ETHBTC",
        "status": "TRADING",
        "baseAsset": "ETH",
        "baseAssetPrecision": 8,
        "quoteAsset": "BTC",
        "quotePrecision": 8,
        "quoteAssetPrecision": 8,
        "orderTypes": ["LIMIT", "LIMIT_MAKER", "MARKET", "STOP_LOSS_LIMIT", "TAKE_PROFIT_LIMIT"],
        "icebergAllowed": true,
        "ocoAllowed": true,
        "quoteOrderQtyMarketAllowed": true,
        "isSpotTradingAllowed": true,
        "isMarginTradingAllowed": true,
        "filters": [
            {"filterType": "PRICE_FILTER", "minPrice": "0.00000100", "maxPrice": "100000.00000000", "tickSize": "0.00000100"},
            {"filterType": "LOT_SIZE", "minQty": "0.00100000", "maxQty": "100000.00000000", "stepSize": "0.00100000"},
            {"filterType": "ICEBERG_PARTS", "limit": 10},
            {"filterType": "MARKET_LOT_SIZE", "minQty": "0.00000000", "maxQty": "930.49505347", "stepSize": "0.00000000"},
            {"filterType": "TRAILING_DELTA", "minTrailingAboveDelta": 10, "maxTrailingAboveDelta": 2000, "minTrailingBelowDelta": 10, "maxTrailingBelowDelta": 2000},
            {"filterType": "PERCENT_PRICE_BY_SIDE", "bidMultiplierUp": "5", "bidMultiplierDown": "0.2", "askMultiplierUp": "5", "askMultiplierDown": "0.2", "avgPriceMins": 5},
            {"filterType": "NOTIONAL", "minNotional": "0.00010000", "applyMinToMarket": true, "maxNotional": "9000000.00000000", "applyMaxToMarket": false, "avgPriceMins": 5},
            {"filterType": "MAX_NUM_ORDERS", "maxNumOrders": 200},
            {"filterType": "MAX_POSITION", "maxPosition": "10.00000000"}
        ],
        "permissions": ["SPOT", "MARGIN", "TRD_GRP_004"]
    }"#;

    #[test]
    fn test_symbol_filters_decode() {
        let symbol: Symbol = serde_json::from_str(SYMBOL).unwrap();
        assert!(symbol.is_trading());
        assert_eq!(symbol.filters.len(), 9);
        assert_eq!(symbol.price_filter().unwrap().tick_size, "0.00000100");
        assert_eq!(symbol.lot_size_filter().unwrap().step_size, "0.00100000");
        assert_eq!(symbol.market_lot_size_filter().unwrap().max_qty, "930.49505347");
        assert_eq!(symbol.iceberg_parts_filter().unwrap().limit, 10);
        assert_eq!(symbol.max_num_orders_filter().unwrap().max_num_orders, 200);
        assert!(symbol.notional_filter().unwrap().apply_min_to_market);
        assert_eq!(
            symbol.trailing_delta_filter().unwrap().max_trailing_below_delta,
            2000
        );
        assert!(symbol.min_notional_filter().is_none());
        assert_eq!(symbol.filters.last(), Some(&SymbolFilter::Other));
    }

    #[test]
    fn test_unknown_permission_is_kept() {
        let symbol: Symbol = serde_json::from_str(SYMBOL).unwrap();
        assert_eq!(symbol.permissions[0], AccountType::Spot);
        assert_eq!(
            symbol.permissions[2],
            AccountType::Unknown("TRD_GRP_004".to_string())
        );
    }

    #[test]
    fn test_exchange_info_lookup() {
        let body = format!(
            r#"{{"timezone":"UTC","serverTime":1565246363776,
                "rateLimits":[{{"rateLimitType":"REQUEST_WEIGHT","interval":"MINUTE","intervalNum":1,"limit":6000}}],
                "exchangeFilters":[],"symbols":[{}]}}"#,
            SYMBOL
        );
        let info: ExchangeInfo = serde_json::from_str(&body).unwrap();
        assert_eq!(info.rate_limits[0].rate_limit_type, RateLimitType::RequestWeight);
        assert!(info.symbol("ETHBTC").is_some());
        assert!(info.symbol("BTCUSDT").is_none());
    }
}
