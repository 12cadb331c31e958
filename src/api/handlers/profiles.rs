//! Handlers for profile endpoints, including avatar upload.

use axum::{
    Extension, Json,
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::profiles::{ProfileResponse, UpdateProfileRequest, UpdateSocialLinksRequest};
use crate::application::services::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Multipart field holding the avatar image.
const AVATAR_FIELD: &str = "file";

/// Returns the caller's profile.
///
/// `GET /profiles/me`
pub async fn my_profile_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.profile_service.get_by_user_id(auth.id).await?;
    Ok(Json(profile.into()))
}

/// Public profile lookup. Private profiles are reported as not found.
///
/// `GET /profiles/username/{username}`
pub async fn profile_by_username_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state
        .profile_service
        .get_public_by_username(&username)
        .await?;
    Ok(Json(profile.into()))
}

/// Partially updates the caller's profile.
///
/// # Endpoint
///
/// `PATCH /profiles/me`
///
/// # Request Body
///
/// ```json
/// { "display_name": "Alice", "bio": null, "accent_color": "#3b82f6", "is_public": true }
/// ```
///
/// Only these fields are read. `bio: null` clears the bio.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    payload.validate()?;

    let profile = state
        .profile_service
        .update(auth.id, payload.into_patch()?)
        .await?;

    Ok(Json(profile.into()))
}

/// Replaces the caller's avatar.
///
/// # Endpoint
///
/// `POST /profiles/me/avatar` with `multipart/form-data`, image in field `file`.
///
/// # Errors
///
/// - **400**: No `file` field, empty file, or not a JPEG/PNG/GIF/WebP image
/// - **413**: File larger than 5 MiB
pub async fn upload_avatar_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let (content_type, bytes) = read_field(field).await?;
        let profile = state
            .profile_service
            .replace_avatar(auth.id, &content_type, bytes)
            .await?;

        return Ok(Json(profile.into()));
    }

    Err(AppError::bad_request(
        "No file uploaded",
        json!({ "field": AVATAR_FIELD }),
    ))
}

async fn read_field(field: Field<'_>) -> Result<(String, Vec<u8>), AppError> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok((content_type, bytes.to_vec()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Upload exceeds the size limit", json!({}))
    } else {
        AppError::bad_request("Malformed multipart body", json!({ "reason": err.body_text() }))
    }
}

/// Replaces the caller's social links.
///
/// # Endpoint
///
/// `PATCH /profiles/me/social-links`
///
/// # Request Body
///
/// ```json
/// { "social_links": { "github": "https://github.com/alice" } }
/// ```
pub async fn update_social_links_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateSocialLinksRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state
        .profile_service
        .update_social_links(auth.id, payload.social_links)
        .await?;

    Ok(Json(profile.into()))
}
