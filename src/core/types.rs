//! Closed string enumerations used on the wire.
//!
//! Every enum carries an `Unknown` variant so that values added by the exchange
//! later still deserialize. Sending an `Unknown` value is rejected by
//! [`wire`](SideType::wire) before a request is built.

use crate::core::errors::ExchangeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Value not known to this version of the crate
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Unknown(raw) => raw.as_str(),
                }
            }

            /// Wire value for a request parameter; `Unknown` is refused
            pub fn wire(&self) -> Result<&'static str, ExchangeError> {
                match self {
                    $( Self::$variant => Ok($wire), )+
                    Self::Unknown(raw) => Err(ExchangeError::Validation(format!(
                        "cannot send unknown {} value '{}'",
                        stringify!($name),
                        raw
                    ))),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Unknown(_))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ExchangeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(ExchangeError::Validation(format!(
                        "unknown {} value '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(raw.parse().unwrap_or_else(|_| Self::Unknown(raw)))
            }
        }
    };
}

wire_enum! {
    SideType {
        Buy => "BUY",
        Sell => "SELL",
    }
}

wire_enum! {
    OrderType {
        Limit => "LIMIT",
        Market => "MARKET",
        LimitMaker => "LIMIT_MAKER",
        StopLoss => "STOP_LOSS",
        StopLossLimit => "STOP_LOSS_LIMIT",
        TakeProfit => "TAKE_PROFIT",
        TakeProfitLimit => "TAKE_PROFIT_LIMIT",
    }
}

wire_enum! {
    TimeInForceType {
        Gtc => "GTC",
        Ioc => "IOC",
        Fok => "FOK",
    }
}

wire_enum! {
    OrderStatusType {
        New => "NEW",
        PendingNew => "PENDING_NEW",
        PartiallyFilled => "PARTIALLY_FILLED",
        Filled => "FILLED",
        Canceled => "CANCELED",
        PendingCancel => "PENDING_CANCEL",
        Rejected => "REJECTED",
        Expired => "EXPIRED",
        ExpiredInMatch => "EXPIRED_IN_MATCH",
    }
}

wire_enum! {
    /// How much detail the order endpoints return
    NewOrderRespType {
        Ack => "ACK",
        Result => "RESULT",
        Full => "FULL",
    }
}

wire_enum! {
    SelfTradePreventionMode {
        None => "NONE",
        ExpireTaker => "EXPIRE_TAKER",
        ExpireMaker => "EXPIRE_MAKER",
        ExpireBoth => "EXPIRE_BOTH",
    }
}

wire_enum! {
    KlineInterval {
        Seconds1 => "1s",
        Minutes1 => "1m",
        Minutes3 => "3m",
        Minutes5 => "5m",
        Minutes15 => "15m",
        Minutes30 => "30m",
        Hours1 => "1h",
        Hours2 => "2h",
        Hours4 => "4h",
        Hours6 => "6h",
        Hours8 => "8h",
        Hours12 => "12h",
        Days1 => "1d",
        Days3 => "3d",
        Weeks1 => "1w",
        Months1 => "1M",
    }
}

wire_enum! {
    SymbolStatusType {
        PreTrading => "PRE_TRADING",
        Trading => "TRADING",
        PostTrading => "POST_TRADING",
        EndOfDay => "END_OF_DAY",
        Halt => "HALT",
        AuctionMatch => "AUCTION_MATCH",
        Break => "BREAK",
    }
}

wire_enum! {
    /// Trading permission of an account or symbol
    AccountType {
        Spot => "SPOT",
        Margin => "MARGIN",
        Leveraged => "LEVERAGED",
    }
}

wire_enum! {
    RateLimitType {
        RequestWeight => "REQUEST_WEIGHT",
        Orders => "ORDERS",
        RawRequests => "RAW_REQUESTS",
    }
}

wire_enum! {
    RateLimitInterval {
        Second => "SECOND",
        Minute => "MINUTE",
        Day => "DAY",
    }
}

wire_enum! {
    /// Direction of a universal transfer between wallets
    UniversalTransferType {
        MainUmFuture => "MAIN_UMFUTURE",
        MainCmFuture => "MAIN_CMFUTURE",
        MainMargin => "MAIN_MARGIN",
        MainFunding => "MAIN_FUNDING",
        UmFutureMain => "UMFUTURE_MAIN",
        UmFutureMargin => "UMFUTURE_MARGIN",
        UmFutureFunding => "UMFUTURE_FUNDING",
        CmFutureMain => "CMFUTURE_MAIN",
        CmFutureMargin => "CMFUTURE_MARGIN",
        CmFutureFunding => "CMFUTURE_FUNDING",
        MarginMain => "MARGIN_MAIN",
        MarginUmFuture => "MARGIN_UMFUTURE",
        MarginCmFuture => "MARGIN_CMFUTURE",
        MarginFunding => "MARGIN_FUNDING",
        FundingMain => "FUNDING_MAIN",
        FundingUmFuture => "FUNDING_UMFUTURE",
        FundingCmFuture => "FUNDING_CMFUTURE",
        FundingMargin => "FUNDING_MARGIN",
    }
}

wire_enum! {
    /// Spot <-> futures wallet transfer direction
    FuturesTransferType {
        SpotToUsdtFuture => "1",
        UsdtFutureToSpot => "2",
        SpotToCoinFuture => "3",
        CoinFutureToSpot => "4",
    }
}

wire_enum! {
    /// Spot <-> cross margin transfer direction
    MarginTransferType {
        ToMargin => "1",
        ToMain => "2",
    }
}

wire_enum! {
    SideEffectType {
        NoSideEffect => "NO_SIDE_EFFECT",
        MarginBuy => "MARGIN_BUY",
        AutoRepay => "AUTO_REPAY",
        AutoBorrowRepay => "AUTO_BORROW_REPAY",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_round_trip() {
        let side: SideType = serde_json::from_str("\"BUY\"").unwrap();
        assert_eq!(side, SideType::Buy);
        assert_eq!(serde_json::to_string(&side).unwrap(), "\"BUY\"");
        assert_eq!(KlineInterval::Months1.as_str(), "1M");
        assert_eq!(KlineInterval::Minutes1.as_str(), "1m");
    }

    #[test]
    fn test_unknown_values_decode_but_do_not_encode() {
        let order_type: OrderType = serde_json::from_str("\"OCO_LEG\"").unwrap();
        assert_eq!(order_type, OrderType::Unknown("OCO_LEG".to_string()));
        assert!(!order_type.is_known());
        assert_eq!(order_type.to_string(), "OCO_LEG");
        assert!(matches!(order_type.wire(), Err(ExchangeError::Validation(_))));
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("GTC".parse::<TimeInForceType>().unwrap(), TimeInForceType::Gtc);
        assert!("gtc".parse::<TimeInForceType>().is_err());
        assert!("GTX".parse::<TimeInForceType>().is_err());
    }

    #[test]
    fn test_numeric_transfer_types() {
        assert_eq!(FuturesTransferType::CoinFutureToSpot.wire().unwrap(), "4");
        assert_eq!(MarginTransferType::ToMargin.wire().unwrap(), "1");
    }
}
