//! API route configuration.
//!
//! Routes are grouped by the protection they need; [`crate::routes`] attaches
//! authentication and rate limiting per group.

use crate::api::handlers::{
    click_link_handler, create_link_handler, delete_link_handler, delete_me_handler,
    get_link_handler, list_links_handler, login_handler, logout_handler, me_handler,
    my_profile_handler, profile_by_username_handler, public_links_handler, refresh_handler,
    register_handler, reorder_links_handler, update_link_handler, update_me_handler,
    update_profile_handler, update_social_links_handler, upload_avatar_handler,
    user_by_username_handler,
};
use crate::application::services::profile_service::MAX_AVATAR_BYTES;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

/// Room for multipart boundaries and headers around the avatar itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Credential endpoints, subject to the strict rate limit.
///
/// - `POST /auth/register` - Create an account and sign in
/// - `POST /auth/login`    - Exchange credentials for tokens
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
}

/// Endpoints requiring a Bearer access token.
///
/// # Endpoints
///
/// - `POST   /auth/logout`               - Revoke the refresh token
/// - `GET    /users/me`                  - Caller's account
/// - `PATCH  /users/me`                  - Change email or password
/// - `DELETE /users/me`                  - Delete account with profile and links
/// - `GET    /links`                     - Caller's links in order (optional pagination)
/// - `POST   /links`                     - Append a link
/// - `PATCH  /links/reorder`             - Rearrange links
/// - `GET    /links/{id}`                - One link
/// - `PATCH  /links/{id}`                - Partially update a link
/// - `DELETE /links/{id}`                - Remove a link
/// - `GET    /profiles/me`               - Caller's profile
/// - `PATCH  /profiles/me`               - Partially update the profile
/// - `POST   /profiles/me/avatar`        - Upload an avatar (multipart)
/// - `PATCH  /profiles/me/social-links`  - Replace social links
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout_handler))
        .route(
            "/users/me",
            get(me_handler)
                .patch(update_me_handler)
                .delete(delete_me_handler),
        )
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route("/links/reorder", patch(reorder_links_handler))
        .route(
            "/links/{id}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route(
            "/profiles/me",
            get(my_profile_handler).patch(update_profile_handler),
        )
        .route(
            "/profiles/me/avatar",
            post(upload_avatar_handler)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + MULTIPART_OVERHEAD)),
        )
        .route(
            "/profiles/me/social-links",
            patch(update_social_links_handler),
        )
}

/// Endpoints open to anyone.
///
/// # Endpoints
///
/// - `POST /auth/refresh`                 - Rotate tokens (refresh token in body)
/// - `GET  /users/username/{username}`    - Public user summary
/// - `GET  /profiles/username/{username}` - Public profile
/// - `GET  /links/user/{user_id}/public`  - Active links of a public profile
/// - `POST /links/{id}/click`             - Count a visit
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/refresh", post(refresh_handler))
        .route("/users/username/{username}", get(user_by_username_handler))
        .route(
            "/profiles/username/{username}",
            get(profile_by_username_handler),
        )
        .route("/links/user/{user_id}/public", get(public_links_handler))
        .route("/links/{id}/click", post(click_link_handler))
}
