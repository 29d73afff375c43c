use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use tracing::warn;

use crate::error::{AppError, AppResult};

/// Process-wide request quota shared by every clone
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    per_minute: u32,
}

impl RateLimitLayer {
    pub fn per_minute(requests: u32) -> AppResult<Self> {
        let burst = NonZeroU32::new(requests).ok_or_else(|| {
            AppError::Startup("webhook rate limit must be greater than zero".to_string())
        })?;

        Ok(RateLimitLayer {
            limiter: Arc::new(RateLimiter::direct(Quota::per_minute(burst))),
            per_minute: requests,
        })
    }

    pub fn quota_per_minute(&self) -> u32 {
        self.per_minute
    }

    pub fn check(&self) -> AppResult<()> {
        self.limiter.check().map_err(|_| AppError::RateLimited)
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimitLayer>,
    req: Request,
    next: Next,
) -> AppResult<Response> {
    if let Err(e) = limiter.check() {
        warn!("⛔ Rate limit hit on {}", req.uri().path());
        return Err(e);
    }
    Ok(next.run(req).await)
}
