use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::orders::models::OrderStatus;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Order-related errors
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Order in invalid state: {current:?}, expected: {expected:?}")]
    InvalidState {
        current: OrderStatus,
        expected: OrderStatus,
    },

    #[error("Invalid order parameters: {0}")]
    InvalidParameters(String),
}

/// TradingView webhook errors
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Invalid webhook passphrase")]
    InvalidPassphrase,

    #[error("Malformed alert payload: {0}")]
    MalformedPayload(String),
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            AppError::Order(OrderError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                "ORDER_NOT_FOUND",
                format!("Order not found: {}", id),
                Some(serde_json::json!({ "order_id": id })),
            ),
            AppError::Order(OrderError::InvalidState { current, expected }) => (
                StatusCode::CONFLICT,
                "ORDER_INVALID_STATE",
                format!("Order is {:?}, expected {:?}", current, expected),
                Some(serde_json::json!({
                    "current": current,
                    "expected": expected,
                })),
            ),
            AppError::Order(OrderError::InvalidParameters(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                msg,
                None,
            ),
            AppError::Webhook(WebhookError::InvalidPassphrase) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_PASSPHRASE",
                "Webhook passphrase rejected".to_string(),
                None,
            ),
            AppError::Webhook(WebhookError::MalformedPayload(msg)) | AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                msg,
                None,
            ),
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                msg,
                None,
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Not found: {}", what),
                None,
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Rate limit exceeded. Please try again later.".to_string(),
                None,
            ),
            AppError::Config(_) | AppError::Startup(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                "The service is misconfigured".to_string(),
                None,
            ),
            AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Webhook(WebhookError::MalformedPayload(error.to_string()))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
