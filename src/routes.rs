//! Top-level router configuration combining API routes and static uploads.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: database, avatar storage (public)
//! - `/auth/*`, `/users/*`, `/links/*`, `/profiles/*` - REST API
//! - `/uploads/*`        - Stored avatar files
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Frontend origin with credentials
//! - **Rate limiting** - Per-IP token bucket, stricter for login/registration
//! - **Authentication** - Bearer access token on protected routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::rate_limit::{self, Limiter};
use crate::api::middleware::{auth, cors, tracing};
use crate::config::Config;
use crate::state::AppState;
use anyhow::Result;
use axum::routing::get;
use axum::{Router, middleware};
use std::path::Path;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Per-IP limiters for the general and credential routes.
#[derive(Clone)]
pub struct RateLimits {
    pub general: Limiter,
    pub auth: Limiter,
}

impl RateLimits {
    /// Builds both limiters from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a limiter configuration is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            general: rate_limit::general(&config.rate_limit)?,
            auth: rate_limit::auth()?,
        })
    }
}

/// Routes and authentication without transport concerns.
///
/// Uploads under `upload_dir` are served at `/uploads`. With `limits` set,
/// every route is rate limited per client IP, which requires the server to
/// provide connect info.
pub fn router(state: AppState, upload_dir: &Path, limits: Option<RateLimits>) -> Router {
    let mut auth_routes = api::routes::auth_routes();
    let mut protected_routes = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
    let mut public_routes = api::routes::public_routes();

    if let Some(limits) = limits {
        auth_routes = auth_routes.layer(rate_limit::layer(&limits.auth));
        protected_routes = protected_routes.layer(rate_limit::layer(&limits.general));
        public_routes = public_routes.layer(rate_limit::layer(&limits.general));
    }

    Router::new()
        .route("/health", get(health_handler))
        .merge(auth_routes)
        .merge(protected_routes)
        .merge(public_routes)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .with_state(state)
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `config` - supplies the upload directory, CORS origin and rate limits
///
/// # Errors
///
/// Returns an error if the CORS origin or rate limits are invalid.
pub fn app_router(state: AppState, config: &Config) -> Result<NormalizePath<Router>> {
    let limits = RateLimits::from_config(config)?;

    let router = router(state, &config.upload_dir, Some(limits))
        .layer(cors::layer(config.frontend_url.as_deref())?)
        .layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}
