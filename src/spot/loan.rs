//! Crypto loans.

use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use rust_decimal::Decimal;
use serde::Deserialize;

impl Client {
    /// `loan_term` is in days: 7, 14, 30, 90 or 180
    pub fn loan_borrow(
        &self,
        loan_coin: impl Into<String>,
        collateral_coin: impl Into<String>,
        loan_term: u32,
    ) -> LoanBorrowService<'_> {
        LoanBorrowService {
            client: self,
            loan_coin: loan_coin.into(),
            collateral_coin: collateral_coin.into(),
            loan_term,
            loan_amount: None,
            collateral_amount: None,
        }
    }

    pub fn list_loan_ongoing_orders(&self) -> ListLoanOngoingOrdersService<'_> {
        ListLoanOngoingOrdersService {
            client: self,
            order_id: None,
            loan_coin: None,
            collateral_coin: None,
            current: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanBorrowResponse {
    pub loan_coin: String,
    pub loan_amount: String,
    pub collateral_coin: String,
    pub collateral_amount: String,
    pub hourly_interest_rate: String,
    pub order_id: i64,
}

/// `POST /sapi/v1/loan/borrow`
///
/// Exactly one of the loan amount and the collateral amount is sent.
#[derive(Debug)]
pub struct LoanBorrowService<'a> {
    client: &'a Client,
    loan_coin: String,
    collateral_coin: String,
    loan_term: u32,
    loan_amount: Option<Decimal>,
    collateral_amount: Option<Decimal>,
}

impl LoanBorrowService<'_> {
    pub fn loan_amount(mut self, amount: Decimal) -> Self {
        self.loan_amount = Some(amount);
        self
    }

    pub fn collateral_amount(mut self, amount: Decimal) -> Self {
        self.collateral_amount = Some(amount);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<LoanBorrowResponse, ExchangeError> {
        if self.loan_amount.is_some() == self.collateral_amount.is_some() {
            return Err(ExchangeError::Validation(
                "exactly one of loanAmount and collateralAmount must be set".to_string(),
            ));
        }
        let mut request = Request::post("/sapi/v1/loan/borrow", SecurityType::Signed);
        request
            .set_param("loanCoin", &self.loan_coin)
            .set_param("collateralCoin", &self.collateral_coin)
            .set_param("loanTerm", self.loan_term)
            .set_opt("loanAmount", self.loan_amount)
            .set_opt("collateralAmount", self.collateral_amount);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOngoingOrder {
    pub order_id: i64,
    pub loan_coin: String,
    pub total_debt: String,
    pub residual_interest: String,
    pub collateral_coin: String,
    pub collateral_amount: String,
    #[serde(rename = "currentLTV")]
    pub current_ltv: String,
    pub expiration_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoanOngoingOrders {
    pub rows: Vec<LoanOngoingOrder>,
    pub total: i64,
}

/// `GET /sapi/v1/loan/ongoing/orders`
#[derive(Debug)]
pub struct ListLoanOngoingOrdersService<'a> {
    client: &'a Client,
    order_id: Option<i64>,
    loan_coin: Option<String>,
    collateral_coin: Option<String>,
    current: Option<u32>,
    limit: Option<u32>,
}

impl ListLoanOngoingOrdersService<'_> {
    pub fn order_id(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn loan_coin(mut self, coin: impl Into<String>) -> Self {
        self.loan_coin = Some(coin.into());
        self
    }

    pub fn collateral_coin(mut self, coin: impl Into<String>) -> Self {
        self.collateral_coin = Some(coin.into());
        self
    }

    pub fn current(mut self, current: u32) -> Self {
        self.current = Some(current);
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
    ) -> Result<LoanOngoingOrders, ExchangeError> {
        let mut request = Request::get("/sapi/v1/loan/ongoing/orders", SecurityType::Signed);
        request
            .set_opt("orderId", self.order_id)
            .set_opt("loanCoin", self.loan_coin.as_deref())
            .set_opt("collateralCoin", self.collateral_coin.as_deref())
            .set_opt("current", self.current)
            .set_opt("limit", self.limit);
        self.client.call_json(ctx, request, opts).await
    }
}
