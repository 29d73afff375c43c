use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::OrderError;

/// Deserialized case-insensitively with surrounding whitespace ignored;
/// `long` and `short` are accepted for strategy alerts.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl<'de> Deserialize<'de> for OrderSide {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        const VARIANTS: &[&str] = &["buy", "sell", "long", "short"];

        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" | "long" => Ok(OrderSide::Buy),
            "sell" | "short" => Ok(OrderSide::Sell),
            _ => Err(de::Error::unknown_variant(&raw, VARIANTS)),
        }
    }
}

/// Deserialized case-insensitively with surrounding whitespace ignored.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

impl<'de> Deserialize<'de> for OrderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        const VARIANTS: &[&str] = &["market", "limit"];

        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            _ => Err(de::Error::unknown_variant(&raw, VARIANTS)),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    Api,
    TradingView,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub status: OrderStatus,
    pub source: OrderSource,
    pub client_order_id: Option<String>,
    pub strategy: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// An order as submitted, before it is assigned an id
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub source: OrderSource,
    pub client_order_id: Option<String>,
    pub strategy: Option<String>,
}

impl NewOrder {
    /// Check the invariants every stored order must satisfy.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.symbol.trim().is_empty() {
            return Err(OrderError::InvalidParameters("symbol must not be empty".into()));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(OrderError::InvalidParameters(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if let Some(price) = self.price {
            if price <= Decimal::ZERO {
                return Err(OrderError::InvalidParameters(format!(
                    "price must be positive, got {}",
                    price
                )));
            }
        }
        if self.order_type == OrderType::Limit && self.price.is_none() {
            return Err(OrderError::InvalidParameters(
                "limit orders require a price".into(),
            ));
        }
        Ok(())
    }
}

impl Order {
    pub fn new(new: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            symbol: normalize_symbol(&new.symbol),
            side: new.side,
            order_type: new.order_type,
            quantity: new.quantity,
            price: new.price,
            status: OrderStatus::Open,
            source: new.source,
            client_order_id: new.client_order_id,
            strategy: new.strategy,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.is_open() {
            return Err(OrderError::InvalidState {
                current: self.status,
                expected: OrderStatus::Open,
            });
        }
        let now = Utc::now();
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;
        self.cancelled_at = Some(now);
        Ok(())
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Filter for listing orders
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub symbol: Option<String>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(symbol) = &self.symbol {
            if order.symbol != normalize_symbol(symbol) {
                return false;
            }
        }
        true
    }
}
