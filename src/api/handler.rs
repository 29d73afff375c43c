use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use super::models::*;
use crate::{
    config::{Settings, SERVICE_NAME, SERVICE_VERSION},
    error::AppError,
    middleware::RateLimitLayer,
    orders::repository::OrderDispatcher,
    signals::{auth::PassphraseGuard, deliveries::DeliveryLedger},
};

const READINESS_TIMEOUT: Duration = Duration::from_millis(250);
const NO_CACHE: [(header::HeaderName, &str); 2] = [
    (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
    (header::PRAGMA, "no-cache"),
];

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub orders: Arc<dyn OrderDispatcher>,
    pub deliveries: Arc<DeliveryLedger>,
    pub passphrase: PassphraseGuard,
    pub webhook_limiter: RateLimitLayer,
    pub started_at: Instant,
}

pub fn root_response() -> RootResponse {
    RootResponse {
        status: "ok".to_string(),
        message: format!("{} is running", SERVICE_NAME),
        version: SERVICE_VERSION.to_string(),
        docs: "/docs".to_string(),
    }
}

/// GET / - Root status probe
pub async fn root() -> Json<RootResponse> {
    Json(root_response())
}

/// Fallback for unrouted paths
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// GET /health - Liveness, no side effects
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "healthy",
        version: SERVICE_VERSION,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    };

    (NO_CACHE, Json(body))
}

/// GET /health/ready - Readiness of the order book and webhook intake
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let orders = match tokio::time::timeout(READINESS_TIMEOUT, state.orders.health()).await {
        Ok(Ok(())) => ComponentCheck {
            name: "orders",
            healthy: true,
            detail: None,
        },
        Ok(Err(e)) => ComponentCheck {
            name: "orders",
            healthy: false,
            detail: Some(e.to_string()),
        },
        Err(_) => ComponentCheck {
            name: "orders",
            healthy: false,
            detail: Some("order book did not respond in time".to_string()),
        },
    };

    let passphrase = if state.passphrase.is_enforced() { "enforced" } else { "not set" };
    let deliveries = match state.deliveries.try_len(READINESS_TIMEOUT) {
        Some(tracked) => ComponentCheck {
            name: "webhook_deliveries",
            healthy: true,
            detail: Some(format!(
                "{} tracked, ttl {}s, passphrase {}",
                tracked,
                state.deliveries.ttl().as_secs(),
                passphrase
            )),
        },
        None => ComponentCheck {
            name: "webhook_deliveries",
            healthy: false,
            detail: Some("delivery ledger did not respond in time".to_string()),
        },
    };

    let checks = vec![orders, deliveries];
    let ready = checks.iter().all(|c| c.healthy);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = ReadinessResponse {
        status: if ready { "ready" } else { "degraded" },
        environment: state.settings.environment.clone(),
        mode: state.settings.mode,
        reload_enabled: state.settings.reload_enabled(),
        checks,
    };

    (status, NO_CACHE, Json(body))
}
