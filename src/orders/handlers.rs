use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::handler::AppState,
    error::AppResult,
    middleware::{validation::positive_decimal, ValidatedJson},
    orders::models::{NewOrder, Order, OrderFilter, OrderSide, OrderSource, OrderType},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 32, message = "symbol must be 1-32 characters"))]
    pub symbol: String,
    pub side: OrderSide,
    #[serde(default)]
    pub order_type: OrderType,
    #[validate(custom = "positive_decimal")]
    pub quantity: Decimal,
    #[serde(default)]
    #[validate(custom = "positive_decimal")]
    pub price: Option<Decimal>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub strategy: Option<String>,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        NewOrder {
            symbol: req.symbol,
            side: req.side,
            order_type: req.order_type,
            quantity: req.quantity,
            price: req.price,
            source: OrderSource::Api,
            client_order_id: req.client_order_id,
            strategy: req.strategy,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total_count: usize,
    pub open_count: usize,
}

/// POST /orders - 201 when created, 200 when `client_order_id` was already used
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    info!("Creating order: {:?} {} {}", req.side, req.quantity, req.symbol);

    let submission = state.orders.submit(req.into()).await?;
    let status = if submission.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(submission.order)))
}

/// GET /orders?status=&symbol=
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<OrderListResponse>> {
    let orders = state.orders.list(&filter).await?;
    let open_count = orders.iter().filter(|o| o.is_open()).count();

    Ok(Json(OrderListResponse {
        total_count: orders.len(),
        open_count,
        orders,
    }))
}

/// GET /orders/:order_id
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get(order_id).await?))
}

/// POST /orders/:order_id/cancel, DELETE /orders/:order_id
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    info!("Cancelling order: {}", order_id);
    Ok(Json(state.orders.cancel(order_id).await?))
}
