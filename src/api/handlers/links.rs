//! Handlers for link management and the public link list.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
};
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::links::{
    CreateLinkRequest, LinkResponse, ReorderLinksRequest, UpdateLinkRequest, link_list,
};
use crate::api::dto::pagination::PaginationParams;
use crate::application::services::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the unpaginated link count.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Lists the caller's links in display order.
///
/// # Endpoint
///
/// `GET /links?page=1&limit=20`
///
/// # Query Parameters
///
/// - `page`, `limit`: optional; applied only together. The total number of
///   links is then returned in `X-Total-Count`.
///
/// # Errors
///
/// Returns 400 if `page` or `limit` is out of range.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<PaginationParams>,
) -> Result<(HeaderMap, Json<Vec<LinkResponse>>), AppError> {
    let mut headers = HeaderMap::new();

    let links = match params.offset_limit()? {
        Some((offset, limit)) => {
            let page = state.link_service.list_page(auth.id, offset, limit).await?;
            headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(page.total));
            page.links
        }
        None => state.link_service.find_ordered(auth.id).await?,
    };

    Ok((headers, Json(link_list(links))))
}

/// Appends a link to the end of the caller's list.
///
/// # Endpoint
///
/// `POST /links`
///
/// # Request Body
///
/// ```json
/// { "title": "Blog", "url": "https://example.com", "description": null, "is_active": true }
/// ```
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.append(auth.id, payload.into()).await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Returns one of the caller's links.
///
/// `GET /links/{id}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get(auth.id, id).await?;
    Ok(Json(link.into()))
}

/// Partially updates one of the caller's links.
///
/// # Endpoint
///
/// `PATCH /links/{id}`
///
/// Position cannot be changed here; use `PATCH /links/reorder`.
pub async fn update_link_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update(auth.id, id, payload.into_patch()?)
        .await?;

    Ok(Json(link.into()))
}

/// Removes one of the caller's links and closes the gap it leaves.
///
/// `DELETE /links/{id}`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.link_service.remove(auth.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rearranges the caller's links.
///
/// # Endpoint
///
/// `PATCH /links/reorder`
///
/// # Request Body
///
/// ```json
/// { "links": [ { "id": "<uuid>", "order": 0 }, { "id": "<uuid>", "order": 1 } ] }
/// ```
///
/// Array position decides the new order. Links left out follow the listed
/// ones in their current relative order.
///
/// # Errors
///
/// Returns 400 for an empty list, a repeated id, or an id the caller does
/// not own. Nothing is changed in that case.
pub async fn reorder_links_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ReorderLinksRequest>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state
        .link_service
        .reorder(auth.id, payload.into_ids())
        .await?;

    Ok(Json(link_list(links)))
}

/// Active links of a user with a public profile.
///
/// `GET /links/user/{user_id}/public`
pub async fn public_links_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.find_public(user_id).await?;
    Ok(Json(link_list(links)))
}

/// Counts a visit to an active link.
///
/// `POST /links/{id}/click`
pub async fn click_link_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.link_service.record_click(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
