use crate::error::AppError;
use axum::{extract::Request, middleware::Next, response::Response};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Duration};

/// Shared in-memory rate limiter handle.
pub type EndpointRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a rate limiter allowing `attempts` requests per `window_seconds`.
///
/// A zero `attempts` or `window_seconds` degrades to the strictest quota
/// (one request per second) rather than panicking at startup.
pub fn create_rate_limiter(attempts: u32, window_seconds: u64) -> EndpointRateLimiter {
    let attempts = NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_secs((window_seconds / u64::from(attempts.get())).max(1));

    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
        .allow_burst(attempts);

    Arc::new(RateLimiter::direct(quota))
}

/// Middleware to rate limit a route group.
pub async fn rate_limit_middleware(
    limiter: EndpointRateLimiter,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => Err(AppError::RateLimited),
    }
}
