//! Wallet (`/sapi`) endpoints: system status, deposits, withdrawals and transfers.

use crate::core::errors::ExchangeError;
use crate::core::kernel::{Client, Context, Request, RequestOption, SecurityType};
use crate::core::types::{FuturesTransferType, UniversalTransferType};
use crate::spot::TransactionResponse;
use rust_decimal::Decimal;
use serde::Deserialize;

impl Client {
    pub fn system_status(&self) -> SystemStatusService<'_> {
        SystemStatusService { client: self }
    }

    pub fn get_deposit_address(&self, coin: impl Into<String>) -> GetDepositAddressService<'_> {
        GetDepositAddressService {
            client: self,
            coin: coin.into(),
            network: None,
        }
    }

    pub fn list_deposits(&self) -> ListDepositsService<'_> {
        ListDepositsService {
            client: self,
            coin: None,
            status: None,
            start_time: None,
            end_time: None,
            offset: None,
            limit: None,
            tx_id: None,
        }
    }

    pub fn create_withdraw(
        &self,
        coin: impl Into<String>,
        address: impl Into<String>,
        amount: Decimal,
    ) -> CreateWithdrawService<'_> {
        CreateWithdrawService {
            client: self,
            coin: coin.into(),
            address: address.into(),
            amount,
            withdraw_order_id: None,
            network: None,
            address_tag: None,
            transaction_fee_flag: None,
            name: None,
            wallet_type: None,
        }
    }

    pub fn create_universal_transfer(
        &self,
        transfer_type: UniversalTransferType,
        asset: impl Into<String>,
        amount: Decimal,
    ) -> CreateUniversalTransferService<'_> {
        CreateUniversalTransferService {
            client: self,
            transfer_type,
            asset: asset.into(),
            amount,
            from_symbol: None,
            to_symbol: None,
        }
    }

    pub fn futures_transfer(
        &self,
        asset: impl Into<String>,
        amount: Decimal,
        transfer_type: FuturesTransferType,
    ) -> FuturesTransferService<'_> {
        FuturesTransferService {
            client: self,
            asset: asset.into(),
            amount,
            transfer_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemStatus {
    /// 0 normal, 1 system maintenance
    pub status: i32,
    pub msg: String,
}

impl SystemStatus {
    pub fn is_normal(&self) -> bool {
        self.status == 0
    }
}

/// `GET /sapi/v1/system/status`
#[derive(Debug)]
pub struct SystemStatusService<'a> {
    client: &'a Client,
}

impl SystemStatusService<'_> {
    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<SystemStatus, ExchangeError> {
        let request = Request::get("/sapi/v1/system/status", SecurityType::None);
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DepositAddress {
    pub address: String,
    pub coin: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub url: String,
}

/// `GET /sapi/v1/capital/deposit/address`
#[derive(Debug)]
pub struct GetDepositAddressService<'a> {
    client: &'a Client,
    coin: String,
    network: Option<String>,
}

impl GetDepositAddressService<'_> {
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<DepositAddress, ExchangeError> {
        let mut request = Request::get("/sapi/v1/capital/deposit/address", SecurityType::Signed);
        request
            .set_param("coin", &self.coin)
            .set_opt("network", self.network.as_deref());
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    #[serde(default)]
    pub id: String,
    pub amount: String,
    pub coin: String,
    pub network: String,
    pub status: i32,
    pub address: String,
    #[serde(default)]
    pub address_tag: String,
    pub tx_id: String,
    pub insert_time: i64,
    #[serde(default)]
    pub transfer_type: i32,
    #[serde(default)]
    pub confirm_times: String,
    #[serde(default)]
    pub wallet_type: i32,
}

/// `GET /sapi/v1/capital/deposit/hisrec`
#[derive(Debug)]
pub struct ListDepositsService<'a> {
    client: &'a Client,
    coin: Option<String>,
    status: Option<i32>,
    start_time: Option<i64>,
    end_time: Option<i64>,
    offset: Option<u32>,
    limit: Option<u32>,
    tx_id: Option<String>,
}

impl ListDepositsService<'_> {
    pub fn coin(mut self, coin: impl Into<String>) -> Self {
        self.coin = Some(coin.into());
        self
    }

    /// 0 pending, 6 credited but cannot withdraw, 1 success
    pub fn status(mut self, status: i32) -> Self {
        self.status = Some(status);
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

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.tx_id = Some(tx_id.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<Vec<Deposit>, ExchangeError> {
        let mut request = Request::get("/sapi/v1/capital/deposit/hisrec", SecurityType::Signed);
        request
            .set_opt("coin", self.coin.as_deref())
            .set_opt("status", self.status)
            .set_opt("startTime", self.start_time)
            .set_opt("endTime", self.end_time)
            .set_opt("offset", self.offset)
            .set_opt("limit", self.limit)
            .set_opt("txId", self.tx_id.as_deref());
        self.client.call_json(ctx, request, opts).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WithdrawResponse {
    pub id: String,
}

/// `POST /sapi/v1/capital/withdraw/apply`
#[derive(Debug)]
pub struct CreateWithdrawService<'a> {
    client: &'a Client,
    coin: String,
    address: String,
    amount: Decimal,
    withdraw_order_id: Option<String>,
    network: Option<String>,
    address_tag: Option<String>,
    transaction_fee_flag: Option<bool>,
    name: Option<String>,
    wallet_type: Option<i32>,
}

impl CreateWithdrawService<'_> {
    pub fn withdraw_order_id(mut self, id: impl Into<String>) -> Self {
        self.withdraw_order_id = Some(id.into());
        self
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Secondary address identifier, e.g. a memo
    pub fn address_tag(mut self, tag: impl Into<String>) -> Self {
        self.address_tag = Some(tag.into());
        self
    }

    pub fn transaction_fee_flag(mut self, flag: bool) -> Self {
        self.transaction_fee_flag = Some(flag);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 0 spot wallet, 1 funding wallet
    pub fn wallet_type(mut self, wallet_type: i32) -> Self {
        self.wallet_type = Some(wallet_type);
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<WithdrawResponse, ExchangeError> {
        let mut request = Request::post("/sapi/v1/capital/withdraw/apply", SecurityType::Signed);
        request
            .set_param("coin", &self.coin)
            .set_param("address", &self.address)
            .set_param("amount", self.amount)
            .set_opt("withdrawOrderId", self.withdraw_order_id.as_deref())
            .set_opt("network", self.network.as_deref())
            .set_opt("addressTag", self.address_tag.as_deref())
            .set_opt("transactionFeeFlag", self.transaction_fee_flag)
            .set_opt("name", self.name.as_deref())
            .set_opt("walletType", self.wallet_type);
        self.client.call_json(ctx, request, opts).await
    }
}

/// `POST /sapi/v1/asset/transfer`
#[derive(Debug)]
pub struct CreateUniversalTransferService<'a> {
    client: &'a Client,
    transfer_type: UniversalTransferType,
    asset: String,
    amount: Decimal,
    from_symbol: Option<String>,
    to_symbol: Option<String>,
}

impl CreateUniversalTransferService<'_> {
    /// Isolated margin symbol to transfer from
    pub fn from_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.from_symbol = Some(symbol.into());
        self
    }

    pub fn to_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.to_symbol = Some(symbol.into());
        self
    }

    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<TransactionResponse, ExchangeError> {
        let mut request = Request::post("/sapi/v1/asset/transfer", SecurityType::Signed);
        request
            .set_param("type", self.transfer_type.wire()?)
            .set_param("asset", &self.asset)
            .set_param("amount", self.amount)
            .set_opt("fromSymbol", self.from_symbol.as_deref())
            .set_opt("toSymbol", self.to_symbol.as_deref());
        self.client.call_json(ctx, request, opts).await
    }
}

/// `POST /sapi/v1/futures/transfer`
#[derive(Debug)]
pub struct FuturesTransferService<'a> {
    client: &'a Client,
    asset: String,
    amount: Decimal,
    transfer_type: FuturesTransferType,
}

impl FuturesTransferService<'_> {
    pub async fn send(
        self,
        ctx: &Context,
        opts: &[RequestOption],
    ) -> Result<TransactionResponse, ExchangeError> {
        let mut request = Request::post("/sapi/v1/futures/transfer", SecurityType::Signed);
        request
            .set_param("asset", &self.asset)
            .set_param("amount", self.amount)
            .set_param("type", self.transfer_type.wire()?);
        self.client.call_json(ctx, request, opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_decode() {
        let deposits: Vec<Deposit> = serde_json::from_str(
            r#"[{"id":"769800519366885376","amount":"0.001","coin":"BNB","network":"BNB","status":1,
                "address":"bnb136ns6lfw4zs5hg4n85vdthaad7hq5m4gtkgf23","addressTag":"101764890",
                "txId":"98A3EA560C6B3336D348B6C83F0F95ECE4F1F5919E94BD006E5BF3BF264FACFC",
                "insertTime":1661493146000,"transferType":0,"confirmTimes":"1/1","unlockConfirm":0,"walletType":0}]"#,
        )
        .unwrap();
        assert_eq!(deposits[0].status, 1);
        assert_eq!(deposits[0].confirm_times, "1/1");
    }

    #[test]
    fn test_system_status() {
        let status: SystemStatus = serde_json::from_str(r#"{"status":0,"msg":"normal"}"#).unwrap();
        assert!(status.is_normal());
    }
}
