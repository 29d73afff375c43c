pub mod auth;
pub mod deliveries;
pub mod handlers;
pub mod models;

use axum::{middleware, routing::post, Router};

use crate::{api::handler::AppState, middleware::rate_limit_middleware, server::RouteGroup};
use handlers::tradingview_webhook;

/// TradingView alert intake, mounted at `/webhook` behind the webhook quota
pub fn routes(state: &AppState) -> RouteGroup {
    let router: Router<AppState> = Router::new()
        .route("/", post(tradingview_webhook))
        .route("/tradingview", post(tradingview_webhook))
        .layer(middleware::from_fn_with_state(
            state.webhook_limiter.clone(),
            rate_limit_middleware,
        ));

    RouteGroup::new("/webhook", "tradingview", router)
        .describe("POST", "/tradingview", "Receive a TradingView alert")
        .describe("POST", "/", "Alias of /webhook/tradingview")
}
