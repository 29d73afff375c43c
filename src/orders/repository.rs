use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppResult, OrderError};
use crate::orders::models::{NewOrder, Order, OrderFilter};

/// Result of submitting an order
#[derive(Clone, Debug)]
pub struct Submission {
    pub order: Order,
    /// `false` when an order with the same `client_order_id` already existed
    pub created: bool,
}

/// Seam between the HTTP routers and wherever orders are kept.
#[async_trait]
pub trait OrderDispatcher: Send + Sync {
    async fn submit(&self, order: NewOrder) -> AppResult<Submission>;

    async fn get(&self, order_id: Uuid) -> AppResult<Order>;

    /// Orders matching `filter`, oldest first
    async fn list(&self, filter: &OrderFilter) -> AppResult<Vec<Order>>;

    async fn cancel(&self, order_id: Uuid) -> AppResult<Order>;

    /// Readiness probe; must not mutate anything.
    async fn health(&self) -> AppResult<()>;
}

/// In-memory order book
pub struct OrderBook {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderDispatcher for OrderBook {
    async fn submit(&self, new: NewOrder) -> AppResult<Submission> {
        new.validate()?;

        // Single write lock so the client_order_id check and the insert are atomic
        let mut orders = self.orders.write().await;

        if let Some(client_id) = new.client_order_id.as_deref() {
            if let Some(existing) = orders
                .values()
                .find(|o| o.client_order_id.as_deref() == Some(client_id))
            {
                info!("↩️  Order replay for client id {} -> {}", client_id, existing.id);
                return Ok(Submission {
                    order: existing.clone(),
                    created: false,
                });
            }
        }

        let order = Order::new(new);
        orders.insert(order.id, order.clone());

        info!(
            "📝 Order accepted: {} {:?} {} {} ({:?})",
            order.id, order.side, order.quantity, order.symbol, order.source
        );

        Ok(Submission {
            order,
            created: true,
        })
    }

    async fn get(&self, order_id: Uuid) -> AppResult<Order> {
        let orders = self.orders.read().await;
        orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(order_id).into())
    }

    async fn list(&self, filter: &OrderFilter) -> AppResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn cancel(&self, order_id: Uuid) -> AppResult<Order> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or(OrderError::NotFound(order_id))?;

        order.cancel()?;
        info!("🚫 Order cancelled: {}", order_id);

        Ok(order.clone())
    }

    async fn health(&self) -> AppResult<()> {
        // A wedged writer would hang here, which the probe's caller times out on
        let _guard = self.orders.read().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::orders::models::{OrderSide, OrderSource, OrderStatus, OrderType};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn new_order(symbol: &str, client_id: Option<&str>) -> NewOrder {
        NewOrder {
            symbol: symbol.to_string(),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: dec!(1),
            price: None,
            source: OrderSource::Api,
            client_order_id: client_id.map(str::to_string),
            strategy: None,
        }
    }

    #[tokio::test]
    async fn test_submit_and_get() {
        let book = OrderBook::new();
        let submission = book.submit(new_order("ethusd", None)).await.unwrap();

        assert!(submission.created);
        let fetched = book.get(submission.order.id).await.unwrap();
        assert_eq!(fetched.symbol, "ETHUSD");
    }

    #[tokio::test]
    async fn test_client_order_id_is_idempotent() {
        let book = OrderBook::new();
        let first = book.submit(new_order("BTCUSD", Some("abc"))).await.unwrap();
        let second = book.submit(new_order("BTCUSD", Some("abc"))).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.order.id, second.order.id);
        assert_eq!(book.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_replays_create_one_order() {
        let book = Arc::new(OrderBook::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let book = book.clone();
            handles.push(tokio::spawn(async move {
                book.submit(new_order("BTCUSD", Some("same"))).await.unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(book.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_orders_are_rejected() {
        let book = OrderBook::new();
        let mut order = new_order("BTCUSD", None);
        order.quantity = dec!(0);

        let err = book.submit(order).await.unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::InvalidParameters(_))));
        assert_eq!(book.len().await, 0);
    }

    #[tokio::test]
    async fn test_cancel_twice_conflicts() {
        let book = OrderBook::new();
        let order = book.submit(new_order("BTCUSD", None)).await.unwrap().order;

        let cancelled = book.cancel(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let err = book.cancel(order.id).await.unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let book = OrderBook::new();
        let err = book.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::NotFound(_))));

        let err = book.cancel(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Order(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let book = OrderBook::new();
        let btc = book.submit(new_order("BTCUSD", None)).await.unwrap().order;
        book.submit(new_order("ETHUSD", None)).await.unwrap();
        book.cancel(btc.id).await.unwrap();

        let all = book.list(&OrderFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let open = book
            .list(&OrderFilter {
                status: Some(OrderStatus::Open),
                symbol: None,
            })
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].symbol, "ETHUSD");

        let btc_only = book
            .list(&OrderFilter {
                status: None,
                symbol: Some("btcusd".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(btc_only.len(), 1);
        assert_eq!(btc_only[0].id, btc.id);
    }
}
