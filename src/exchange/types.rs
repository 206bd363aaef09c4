//! Order vocabulary shared by the strategies and the venue gateways,
//! plus the Binance wire formats they map to.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side that closes a position opened on this side.
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(format!("side must be BUY or SELL, got '{}'", other)),
        }
    }
}

/// Order type.
///
/// The variant names describe the behaviour; the serialized names are the
/// Binance Futures `type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "LIMIT")]
    Limit,
    #[serde(rename = "MARKET")]
    Market,
    /// Market order released when the trigger price is touched.
    #[serde(rename = "STOP_MARKET")]
    StopTrigger,
    /// Limit order released when the trigger price is touched.
    #[serde(rename = "STOP")]
    StopTriggerLimit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::StopTrigger => "STOP_MARKET",
            OrderType::StopTriggerLimit => "STOP",
        }
    }

    pub fn requires_limit_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopTriggerLimit)
    }

    pub fn requires_trigger_price(&self) -> bool {
        matches!(self, OrderType::StopTrigger | OrderType::StopTriggerLimit)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time in force for resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    Gtc, // Good Till Cancel
    Ioc, // Immediate or Cancel
    Fok, // Fill or Kill
    Gtx, // Post Only (Good Till Crossing)
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
            TimeInForce::Gtx => "GTX",
        }
    }
}

/// Price source a trigger is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingType {
    #[default]
    MarkPrice,
    ContractPrice,
}

impl WorkingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkingType::MarkPrice => "MARK_PRICE",
            WorkingType::ContractPrice => "CONTRACT_PRICE",
        }
    }
}

impl fmt::Display for WorkingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MARK_PRICE" => Ok(WorkingType::MarkPrice),
            "CONTRACT_PRICE" => Ok(WorkingType::ContractPrice),
            other => Err(format!(
                "working type must be MARK_PRICE or CONTRACT_PRICE, got '{}'",
                other
            )),
        }
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    ExpiredInMatch,
}

/// A single order ready for submission.
///
/// Built by the strategy planner (or directly for single orders) and handed
/// to a [`crate::exchange::VenueGateway`] exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildOrderSpec {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
    pub working_type: Option<WorkingType>,
    pub time_in_force: TimeInForce,
}

impl ChildOrderSpec {
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            trigger_price: None,
            working_type: None,
            time_in_force: TimeInForce::Gtc,
        }
    }

    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            price: Some(price),
            order_type: OrderType::Limit,
            ..Self::market(symbol, side, quantity)
        }
    }

    /// Stop-market order: a market order released at `trigger_price`.
    pub fn stop_trigger(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        trigger_price: Decimal,
        working_type: WorkingType,
    ) -> Self {
        Self {
            order_type: OrderType::StopTrigger,
            trigger_price: Some(trigger_price),
            working_type: Some(working_type),
            ..Self::market(symbol, side, quantity)
        }
    }

    /// Stop-limit order: a limit order at `price` released at `trigger_price`.
    pub fn stop_trigger_limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
        trigger_price: Decimal,
        working_type: WorkingType,
    ) -> Self {
        Self {
            order_type: OrderType::StopTriggerLimit,
            price: Some(price),
            trigger_price: Some(trigger_price),
            working_type: Some(working_type),
            ..Self::market(symbol, side, quantity)
        }
    }

    /// Check the structural invariants of the order.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("symbol must not be empty".to_string());
        }
        if self.quantity <= Decimal::ZERO {
            return Err(format!("quantity must be > 0, got {}", self.quantity));
        }
        if self.order_type.requires_limit_price() {
            match self.price {
                Some(p) if p > Decimal::ZERO => {}
                Some(p) => return Err(format!("price must be > 0, got {}", p)),
                None => return Err(format!("{} order requires a price", self.order_type)),
            }
        }
        if self.order_type.requires_trigger_price() {
            match self.trigger_price {
                Some(p) if p > Decimal::ZERO => {}
                Some(p) => return Err(format!("trigger price must be > 0, got {}", p)),
                None => {
                    return Err(format!(
                        "{} order requires a trigger price",
                        self.order_type
                    ))
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ChildOrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.order_type, self.side, self.quantity, self.symbol
        )?;
        if let Some(price) = self.price {
            write!(f, " @ {}", price)?;
        }
        if let Some(trigger) = self.trigger_price {
            write!(f, " (trigger {}", trigger)?;
            if let Some(wt) = self.working_type {
                write!(f, " on {}", wt)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Venue-agnostic acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: i64,
    pub client_order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub trigger_price: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

/// Order response from Binance Futures `POST /fapi/v1/order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i64,
    pub symbol: String,
    pub status: OrderStatus,
    pub client_order_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub avg_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str")]
    pub orig_qty: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub executed_qty: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub stop_price: Option<Decimal>,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub working_type: Option<WorkingType>,
    pub update_time: i64,
}

impl From<OrderResponse> for OrderReceipt {
    fn from(response: OrderResponse) -> Self {
        // Binance echoes "0" for fields that do not apply to the order type.
        let non_zero = |d: Decimal| (d > Decimal::ZERO).then_some(d);
        Self {
            order_id: response.order_id,
            client_order_id: response.client_order_id,
            symbol: response.symbol,
            side: response.side,
            order_type: response.order_type,
            status: response.status,
            quantity: response.orig_qty,
            price: non_zero(response.price),
            trigger_price: response.stop_price.and_then(non_zero),
            updated_at: Utc
                .timestamp_millis_opt(response.update_time)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }
}

/// Mark price and funding snapshot from `GET /fapi/v1/premiumIndex`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPrice {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub mark_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub index_price: Option<Decimal>,
    #[serde(default)]
    pub time: i64,
}

/// Error body returned by Binance for rejected requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}
