use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::validation::positive_decimal;
use crate::orders::models::{NewOrder, OrderSide, OrderSource, OrderType};

/// Alert body posted by a TradingView alert or strategy.
///
/// Field names follow the common `{{ticker}}` / `{{strategy.order.action}}`
/// placeholders; `symbol` and `contracts` are accepted as aliases.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TradingViewAlert {
    #[serde(default)]
    pub passphrase: Option<String>,

    #[serde(alias = "symbol")]
    #[validate(length(min = 1, max = 32, message = "ticker must be 1-32 characters"))]
    pub ticker: String,

    pub action: OrderSide,

    #[serde(alias = "contracts", alias = "qty")]
    #[validate(custom = "positive_decimal")]
    pub quantity: Decimal,

    #[serde(default)]
    #[validate(custom = "positive_decimal")]
    pub price: Option<Decimal>,

    #[serde(default)]
    pub order_type: Option<OrderType>,

    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub alert_id: Option<String>,

    #[serde(default)]
    pub strategy: Option<String>,

    #[serde(default)]
    pub exchange: Option<String>,

    #[serde(default)]
    pub time: Option<String>,
}

impl TradingViewAlert {
    pub fn to_new_order(&self) -> NewOrder {
        NewOrder {
            symbol: self.ticker.clone(),
            side: self.action,
            order_type: self.order_type.unwrap_or_default(),
            quantity: self.quantity,
            price: self.price,
            source: OrderSource::TradingView,
            client_order_id: None,
            strategy: self.strategy.clone(),
        }
    }
}

/// Webhook processing response
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub accepted: bool,
    pub duplicate: bool,
    pub order_id: Option<Uuid>,
    pub idempotency_key: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_strategy_alert() {
        let body = r#"{
            "passphrase": "hunter2",
            "symbol": "BTCUSDT",
            "action": "BUY",
            "contracts": "0.25",
            "price": 64000.5,
            "strategy": "ema-cross",
            "time": "2024-05-01T12:00:00Z"
        }"#;

        let alert: TradingViewAlert = serde_json::from_str(body).unwrap();
        assert_eq!(alert.ticker, "BTCUSDT");
        assert_eq!(alert.action, OrderSide::Buy);
        assert_eq!(alert.quantity, dec!(0.25));
        assert!(alert.validate().is_ok());

        let order = alert.to_new_order();
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.source, OrderSource::TradingView);
        assert_eq!(order.strategy.as_deref(), Some("ema-cross"));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let zero: TradingViewAlert =
            serde_json::from_str(r#"{"ticker":"ETHUSD","action":"sell","quantity":0}"#).unwrap();
        assert!(zero.validate().is_err());

        let empty: TradingViewAlert =
            serde_json::from_str(r#"{"ticker":"","action":"sell","quantity":1}"#).unwrap();
        assert!(empty.validate().is_err());

        let unknown_action =
            serde_json::from_str::<TradingViewAlert>(r#"{"ticker":"ETHUSD","action":"hold","quantity":1}"#);
        assert!(unknown_action.is_err());
    }

    #[test]
    fn test_action_and_order_type_are_case_insensitive() {
        let alert: TradingViewAlert = serde_json::from_str(
            r#"{"ticker":"ETHUSD","action":" bUy ","quantity":1,"order_type":"lImit","price":3100}"#,
        )
        .unwrap();

        assert_eq!(alert.action, OrderSide::Buy);
        assert_eq!(alert.order_type, Some(OrderType::Limit));
        assert!(alert.validate().is_ok());
    }
}
