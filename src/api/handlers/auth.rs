//! Handlers for registration, login and session management.

use axum::{Extension, Json, extract::State, http::StatusCode};
use tracing::{info, warn};
use validator::Validate;

use crate::api::dto::auth::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};
use crate::application::services::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates an account with a default profile and signs it in.
///
/// # Endpoint
///
/// `POST /auth/register`
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "email": "alice@example.com", "password": "Secret123" }
/// ```
///
/// # Errors
///
/// - **400**: Validation failed
/// - **409**: Username or email already taken
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.validate()?;

    let user = state
        .user_service
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    let tokens = state.auth_service.issue_session(&user).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(&user, tokens))))
}

/// Exchanges credentials for an access and refresh token pair.
///
/// # Endpoint
///
/// `POST /auth/login`
///
/// # Errors
///
/// - **401**: Unknown user, wrong password or inactive account (indistinguishable)
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let Some(user) = state
        .user_service
        .validate_credentials(&payload.username, &payload.password)
        .await?
    else {
        warn!(username = %payload.username, "Failed login attempt");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    let tokens = state.auth_service.issue_session(&user).await?;

    metrics::counter!("logins_total").increment(1);
    info!(user_id = %user.id, "user_logged_in");

    Ok(Json(AuthResponse::new(&user, tokens)))
}

/// Rotates the token pair. The presented refresh token stops working.
///
/// # Endpoint
///
/// `POST /auth/refresh`
///
/// # Request Body
///
/// ```json
/// { "refresh_token": "<jwt>" }
/// ```
///
/// # Errors
///
/// - **401**: Token invalid, expired, already used or revoked
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let (user, tokens) = state
        .auth_service
        .refresh_session(&payload.refresh_token)
        .await?;

    Ok(Json(AuthResponse::new(&user, tokens)))
}

/// Revokes the caller's refresh token.
///
/// # Endpoint
///
/// `POST /auth/logout`
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    state.auth_service.revoke_session(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
