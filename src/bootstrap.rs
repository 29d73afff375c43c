use std::{sync::Arc, time::Instant};
use tracing::{info, warn};
use crate::{
    api::handler::AppState,
    config::Settings,
    error::AppResult,
    middleware::RateLimitLayer,
    orders::OrderBook,
    signals::{auth::PassphraseGuard, deliveries::DeliveryLedger},
};

pub fn initialize_app_state(settings: Settings) -> AppResult<AppState> {
    info!("Initializing application components ...");

    // Order book
    let orders = Arc::new(OrderBook::new());
    info!("✅ Order book initialized");

    // Webhook intake
    let deliveries = Arc::new(DeliveryLedger::new(settings.webhook_dedup_ttl));
    info!(
        "✅ Webhook delivery ledger initialized (ttl: {}s)",
        settings.webhook_dedup_ttl.as_secs()
    );

    let passphrase = PassphraseGuard::new(settings.tradingview_passphrase.as_deref());
    if !passphrase.is_enforced() {
        warn!("⚠️  TRADINGVIEW_PASSPHRASE not set, webhook alerts are accepted without a passphrase");
    }

    let webhook_limiter = RateLimitLayer::per_minute(settings.webhook_rate_limit_per_minute)?;
    info!(
        "✅ Webhook rate limit: {} requests/minute",
        webhook_limiter.quota_per_minute()
    );

    info!("✅ All components initialized successfully");

    Ok(AppState {
        settings: Arc::new(settings),
        orders,
        deliveries,
        passphrase,
        webhook_limiter,
        started_at: Instant::now(),
    })
}
