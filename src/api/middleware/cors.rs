//! CORS policy for the frontend origin.

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

/// Allows the configured frontend origin to call the API with credentials.
///
/// Without an origin no cross-origin request is allowed.
///
/// # Errors
///
/// Returns an error if the origin is not a valid header value.
pub fn layer(frontend_url: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = frontend_url else {
        return Ok(CorsLayer::new());
    };

    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid FRONTEND_URL '{}'", origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_with_and_without_origin() {
        assert!(layer(None).is_ok());
        assert!(layer(Some("http://localhost:3000")).is_ok());
        assert!(layer(Some("bad\norigin")).is_err());
    }
}
