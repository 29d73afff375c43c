use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

/// Identity of a webhook delivery: the sender's alert id when given,
/// otherwise a digest of the raw body.
pub fn idempotency_key(alert_id: Option<&str>, raw_body: &[u8]) -> String {
    match alert_id {
        Some(id) => format!("alert:{}", id),
        None => format!("sha256:{}", hex::encode(Sha256::digest(raw_body))),
    }
}

#[derive(Debug, Clone)]
struct Delivery {
    order_id: Option<Uuid>,
    seen_at: Instant,
}

/// Outcome of claiming a delivery key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// First delivery; the caller must `complete` or `release` it.
    New,
    /// Seen before. `None` while the first delivery is still in flight.
    Duplicate(Option<Uuid>),
}

/// Remembers recent webhook deliveries so redeliveries are not dispatched twice
pub struct DeliveryLedger {
    deliveries: Mutex<HashMap<String, Delivery>>,
    ttl: Duration,
}

impl DeliveryLedger {
    pub fn new(ttl: Duration) -> Self {
        Self {
            deliveries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Atomically claim `key`; expired entries are pruned first.
    pub fn claim(&self, key: &str) -> Claim {
        let now = Instant::now();
        let mut deliveries = self.deliveries.lock();

        let before = deliveries.len();
        deliveries.retain(|_, d| now.duration_since(d.seen_at) < self.ttl);
        if before > deliveries.len() {
            debug!("🧹 Pruned {} expired webhook deliveries", before - deliveries.len());
        }

        if let Some(existing) = deliveries.get(key) {
            info!("🔁 Duplicate webhook delivery: {}", key);
            return Claim::Duplicate(existing.order_id);
        }

        deliveries.insert(
            key.to_string(),
            Delivery {
                order_id: None,
                seen_at: now,
            },
        );
        Claim::New
    }

    /// Record the order produced by a claimed delivery
    pub fn complete(&self, key: &str, order_id: Uuid) {
        if let Some(delivery) = self.deliveries.lock().get_mut(key) {
            delivery.order_id = Some(order_id);
        }
    }

    /// Forget a claim whose dispatch failed so the sender's retry can succeed
    pub fn release(&self, key: &str) {
        self.deliveries.lock().remove(key);
    }

    /// Number of tracked deliveries, or `None` if the ledger stayed locked
    /// for longer than `timeout`.
    pub fn try_len(&self, timeout: Duration) -> Option<usize> {
        self.deliveries.try_lock_for(timeout).map(|d| d.len())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
