pub mod handlers;
pub mod models;
pub mod repository;

pub use repository::{OrderBook, OrderDispatcher};

use axum::{
    routing::{get, post},
    Router,
};

use crate::{api::handler::AppState, server::RouteGroup};
use handlers::{cancel_order, create_order, get_order, list_orders};

/// Order lifecycle endpoints, mounted at `/orders`
pub fn routes() -> RouteGroup {
    let router: Router<AppState> = Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:order_id", get(get_order).delete(cancel_order))
        .route("/:order_id/cancel", post(cancel_order));

    RouteGroup::new("/orders", "orders", router)
        .describe("POST", "/", "Create an order")
        .describe("GET", "/", "List orders, filterable by status and symbol")
        .describe("GET", "/{order_id}", "Get one order")
        .describe("POST", "/{order_id}/cancel", "Cancel an open order")
        .describe("DELETE", "/{order_id}", "Cancel an open order")
}
