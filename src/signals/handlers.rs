use axum::{body::Bytes, extract::State, Json};
use tracing::{debug, error, info};

use crate::{
    api::handler::AppState,
    error::AppResult,
    middleware::validate_payload,
    signals::{
        deliveries::{idempotency_key, Claim},
        models::{TradingViewAlert, WebhookResponse},
    },
};

/// Receive a TradingView alert and hand it to the order dispatcher
/// POST /webhook/tradingview
///
/// The body is parsed as JSON whatever the content type, since TradingView
/// posts JSON alerts as `text/plain` unless the message is sent verbatim.
/// Redeliveries of the same alert are acknowledged without dispatching again.
pub async fn tradingview_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    let alert: TradingViewAlert = serde_json::from_slice(&body)?;

    state.passphrase.verify(alert.passphrase.as_deref())?;
    validate_payload(&alert)?;

    let key = idempotency_key(alert.alert_id.as_deref(), &body);

    if let Claim::Duplicate(order_id) = state.deliveries.claim(&key) {
        return Ok(Json(WebhookResponse {
            accepted: true,
            duplicate: true,
            order_id,
            idempotency_key: key,
            message: "Duplicate delivery ignored".to_string(),
        }));
    }

    info!(
        "🔔 TradingView alert: {:?} {} {} (strategy: {})",
        alert.action,
        alert.quantity,
        alert.ticker,
        alert.strategy.as_deref().unwrap_or("-")
    );

    debug!(
        "Alert {} from exchange {} at {}",
        key,
        alert.exchange.as_deref().unwrap_or("-"),
        alert.time.as_deref().unwrap_or("-")
    );

    match state.orders.submit(alert.to_new_order()).await {
        Ok(submission) => {
            state.deliveries.complete(&key, submission.order.id);

            Ok(Json(WebhookResponse {
                accepted: true,
                duplicate: false,
                order_id: Some(submission.order.id),
                idempotency_key: key,
                message: "Alert accepted, order dispatched".to_string(),
            }))
        }
        Err(e) => {
            state.deliveries.release(&key);
            error!("Failed to dispatch alert {}: {}", key, e);
            Err(e)
        }
    }
}
