//! Simple Earn flexible products.

use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use rust_decimal::Decimal;
use serde::Deserialize;

impl Client {
    pub fn list_flexible_products(&self) -> ListFlexibleProductsService<'_> {
        ListFlexibleProductsService {
            client: self,
            asset: None,
            current: None,
            size: None,
        }
    }

    pub fn subscribe_flexible_product(
        &self,
        product_id: impl Into<String>,
        amount: Decimal,
    ) -> SubscribeFlexibleProductService<'_> {
        SubscribeFlexibleProductService {
            client: self,
            product_id: product_id.into(),
            amount,
            auto_subscribe: None,
        }
    }

    pub fn redeem_flexible_product(
        &self,
        product_id: impl Into<String>,
    ) -> RedeemFlexibleProductService<'_> {
        RedeemFlexibleProductService {
            client: self,
            product_id: product_id.into(),
            redeem_all: None,
            amount: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleProduct {
    pub asset: String,
    pub latest_annual_percentage_rate: String,
    pub can_purchase: bool,
    pub can_redeem: bool,
    pub is_sold_out: bool,
    #[serde(default)]
    pub hot: bool,
    pub min_purchase_amount: String,
    pub product_id: String,
    #[serde(default)]
    pub subscription_start_time: i64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlexibleProductList {
    pub rows: Vec<FlexibleProduct>,
    pub total: i64,
}

/// `GET /sapi/v1/simple-earn/flexible/list`
#[derive(Debug)]
pub struct ListFlexibleProductsService<'a> {
    client: &'a Client,
    asset: Option<String>,
    current: Option<u32>,
    size: Option<u32>,
}

impl ListFlexibleProductsService<'_> {
    pub fn asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = Some(asset.into());
        self
    }

    /// 1-based page number
    pub fn current(mut self, current: u32) -> Self {
        self.current = Some(current);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<FlexibleProductList, ExchangeError> {
        let mut request = Request::get("/sapi/v1/simple-earn/flexible/list", SecurityType::Signed);
        request
            .set_opt("asset", self.asset.as_deref())
            .set_opt("current", self.current)
            .set_opt("size", self.size);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub purchase_id: i64,
    pub success: bool,
}

/// `POST /sapi/v1/simple-earn/flexible/subscribe`
#[derive(Debug)]
pub struct SubscribeFlexibleProductService<'a> {
    client: &'a Client,
    product_id: String,
    amount: Decimal,
    auto_subscribe: Option<bool>,
}

impl SubscribeFlexibleProductService<'_> {
    pub fn auto_subscribe(mut self, auto_subscribe: bool) -> Self {
        self.auto_subscribe = Some(auto_subscribe);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<SubscribeResponse, ExchangeError> {
        let mut request = Request::post(
            "/sapi/v1/simple-earn/flexible/subscribe",
            SecurityType::Signed,
        );
        request
            .set_param("productId", &self.product_id)
            .set_param("amount", self.amount)
            .set_opt("autoSubscribe", self.auto_subscribe);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub redeem_id: i64,
    pub success: bool,
}

/// `POST /sapi/v1/simple-earn/flexible/redeem`
///
/// Either [`Self::redeem_all`] or [`Self::amount`] must be set.
#[derive(Debug)]
pub struct RedeemFlexibleProductService<'a> {
    client: &'a Client,
    product_id: String,
    redeem_all: Option<bool>,
    amount: Option<Decimal>,
}

impl RedeemFlexibleProductService<'_> {
    pub fn redeem_all(mut self, redeem_all: bool) -> Self {
        self.redeem_all = Some(redeem_all);
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<RedeemResponse, ExchangeError> {
        if self.redeem_all != Some(true) && self.amount.is_none() {
            return Err(ExchangeError::Validation(
                "redeem requires an amount unless redeemAll is set".to_string(),
            ));
        }
        let mut request = Request::post("/sapi/v1/simple-earn/flexible/redeem", SecurityType::Signed);
        request
            .set_param("productId", &self.product_id)
            .set_opt("redeemAll", self.redeem_all)
            .set_opt("amount", self.amount);
        self.client.call_json(ctx, request, opts).await
    }
}
