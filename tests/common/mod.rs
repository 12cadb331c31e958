#![allow(dead_code)]

use axum_test::TestServer;
use linkhub::api::middleware::rate_limit;
use linkhub::config::{JwtConfig, RateLimitConfig};
use linkhub::domain::entities::User;
use linkhub::infrastructure::storage::LocalAvatarStore;
use linkhub::routes;
use linkhub::state::AppState;
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

pub const PASSWORD: &str = "Secret123";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        access_ttl: 900,
        refresh_ttl: 7 * 24 * 3600,
    }
}

/// Fresh upload directory under the system temp dir.
pub fn temp_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("linkhub-it-{}", Uuid::new_v4()))
}

pub fn create_test_state(pool: PgPool, upload_dir: &Path) -> AppState {
    let avatars = Arc::new(LocalAvatarStore::new(upload_dir));
    AppState::new(Arc::new(pool), test_jwt_config(), avatars)
}

/// Full router without rate limiting, plus the directory it stores uploads in.
pub fn create_test_server(pool: PgPool) -> (TestServer, AppState, PathBuf) {
    let upload_dir = temp_upload_dir();
    let state = create_test_state(pool, &upload_dir);
    let app = routes::router(state.clone(), &upload_dir, None);

    (TestServer::new(app).unwrap(), state, upload_dir)
}

/// Full router where public and protected routes allow `max_requests` per
/// minute per client, served over a real socket so the client IP is known.
pub fn create_rate_limited_server(pool: PgPool, max_requests: u32) -> (TestServer, AppState) {
    let upload_dir = temp_upload_dir();
    let state = create_test_state(pool, &upload_dir);
    let limits = routes::RateLimits {
        general: rate_limit::general(&RateLimitConfig {
            ttl_seconds: 60,
            max_requests,
        })
        .unwrap(),
        auth: rate_limit::auth().unwrap(),
    };
    let app = routes::router(state.clone(), &upload_dir, Some(limits));

    let server = TestServer::new(app.into_make_service_with_connect_info::<SocketAddr>()).unwrap();
    (server, state)
}

pub async fn create_user(state: &AppState, username: &str) -> User {
    state
        .user_service
        .register(username, &format!("{username}@example.com"), PASSWORD)
        .await
        .unwrap()
}

pub async fn access_token(state: &AppState, user: &User) -> String {
    state
        .auth_service
        .issue_session(user)
        .await
        .unwrap()
        .access_token
}

/// Registers a user and returns it with a valid access token.
pub async fn signed_in_user(state: &AppState, username: &str) -> (User, String) {
    let user = create_user(state, username).await;
    let token = access_token(state, &user).await;
    (user, token)
}

/// Creates a link over HTTP and returns its id.
pub async fn create_link(server: &TestServer, token: &str, title: &str) -> Uuid {
    let response = server
        .post("/links")
        .authorization_bearer(token)
        .json(&json!({ "title": title, "url": format!("https://example.com/{title}") }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let id = response.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();
    Uuid::parse_str(&id).unwrap()
}

/// `(id, position)` pairs of a user's links, read straight from the table.
pub async fn positions(pool: &PgPool, user_id: Uuid) -> Vec<(Uuid, i32)> {
    sqlx::query_as(
        "SELECT id, position FROM links WHERE user_id = $1 ORDER BY position, created_at, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .unwrap()
}

pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}
