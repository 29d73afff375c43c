pub mod handler;
pub mod models;

use axum::{routing::get, Router};

use crate::server::RouteGroup;
use handler::{health_check, readiness_check, AppState};

/// Liveness and readiness probes, mounted at `/health`
pub fn routes() -> RouteGroup {
    let router: Router<AppState> = Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check));

    RouteGroup::new("/health", "health", router)
        .describe("GET", "/", "Liveness probe")
        .describe("GET", "/ready", "Readiness of the order book and webhook intake")
}
