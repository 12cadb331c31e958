//! Handlers for account endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::api::dto::users::{PublicUserResponse, UpdateUserRequest, UserResponse};
use crate::application::services::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the caller's account.
///
/// `GET /users/me`
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.get_by_id(auth.id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Changes the caller's email and/or password.
///
/// `PATCH /users/me`
///
/// A password change revokes the refresh token, so other sessions must sign
/// in again.
pub async fn update_me_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let user = state
        .user_service
        .update(auth.id, payload.email.as_deref(), payload.password.as_deref())
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// Deletes the caller's account together with its profile and links.
///
/// `DELETE /users/me`
pub async fn delete_me_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    state.user_service.delete(auth.id).await?;
    info!(user_id = %auth.id, "account_deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Public summary of a user.
///
/// `GET /users/username/{username}`
pub async fn user_by_username_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicUserResponse>, AppError> {
    let user = state.user_service.get_public_by_username(&username).await?;
    Ok(Json(PublicUserResponse::from(&user)))
}
