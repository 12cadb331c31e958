//! Rate limiting middleware using token bucket algorithm.

use anyhow::{Context, Result};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    GovernorError, GovernorLayer,
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::PeerIpKeyExtractor,
};

use crate::config::RateLimitConfig;
use crate::error::AppError;

/// Layer type shared by both limiters.
pub type RateLimitLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// A limiter's configuration and bucket state. Layers built from the same
/// limiter share one bucket per client.
pub type Limiter = Arc<GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>>>;

/// Login and registration attempts allowed per client per minute.
const AUTH_ATTEMPTS_PER_MINUTE: u32 = 5;

/// Builds a per-IP bucket holding `max` requests refilled over `window`.
fn build(max: u32, window: Duration) -> Result<Limiter> {
    let max = max.max(1);
    let per_request = (window / max).max(Duration::from_millis(1));

    let governor_conf = GovernorConfigBuilder::default()
        .period(per_request)
        .burst_size(max)
        .finish()
        .context("Invalid rate limit configuration")?;

    Ok(Arc::new(governor_conf))
}

/// Renders limiter rejections with the regular error body.
///
/// The `retry-after` and `x-ratelimit-after` headers set by the limiter are
/// kept.
fn error_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut response = AppError::rate_limited(wait_time).into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::internal("Unable to identify client", json!({})).into_response()
        }
        GovernorError::Other { code, msg, .. } => AppError::internal(
            "Rate limiter error",
            json!({ "status": code.as_u16(), "reason": msg }),
        )
        .into_response(),
    }
}

/// Wraps a limiter into a layer for one group of routes.
pub fn layer(limiter: &Limiter) -> RateLimitLayer {
    GovernorLayer::new(Arc::clone(limiter)).error_handler(error_response)
}

/// Creates the general limiter applied to every route.
///
/// # Limits
///
/// `RATE_LIMIT_MAX` requests per `RATE_LIMIT_TTL` seconds, refilled evenly.
/// Requests exceeding the limit receive `429 Too Many Requests` with a
/// `rate_limited` error body.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address, so the server must be run with connect info.
///
/// # Errors
///
/// Returns an error if the configuration yields an empty bucket.
pub fn general(config: &RateLimitConfig) -> Result<Limiter> {
    build(
        config.max_requests,
        Duration::from_secs(config.ttl_seconds),
    )
}

/// Creates the stricter limiter for login and registration.
///
/// # Limits
///
/// 5 attempts per minute per client IP.
///
/// # Example
///
/// ```rust,ignore
/// let auth_routes = Router::new()
///     .route("/auth/login", post(login_handler))
///     .layer(rate_limit::layer(&rate_limit::auth()?));
/// ```
pub fn auth() -> Result<Limiter> {
    build(AUTH_ATTEMPTS_PER_MINUTE, Duration::from_secs(60))
}
