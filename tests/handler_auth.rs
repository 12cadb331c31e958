mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

#[sqlx::test]
async fn test_register_returns_tokens_and_creates_profile(pool: PgPool) {
    let (server, _state, _dir) = common::create_test_server(pool);

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "Alice",
            "email": "alice@example.com",
            "password": "Secret123"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<Value>();
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["user"]["username"], "alice");
    assert!(json["user"].get("password_hash").is_none());

    let token = json["access_token"].as_str().unwrap();
    let profile = server
        .get("/profiles/me")
        .authorization_bearer(token)
        .await;

    profile.assert_status_ok();
    let profile = profile.json::<Value>();
    assert_eq!(profile["display_name"], "alice");
    assert_eq!(profile["avatar_url"], "/images/default-avatar.png");
}

#[sqlx::test]
async fn test_register_validation_errors(pool: PgPool) {
    let (server, _state, _dir) = common::create_test_server(pool);

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "a b",
            "email": "not-an-email",
            "password": "weak"
        }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["error"]["details"].get("username").is_some());
    assert!(json["error"]["details"].get("email").is_some());
    assert!(json["error"]["details"].get("password").is_some());
}

#[sqlx::test]
async fn test_register_duplicate_username(pool: PgPool) {
    let (server, state, _dir) = common::create_test_server(pool);
    common::create_user(&state, "alice").await;

    let response = server
        .post("/auth/register")
        .json(&json!({
            "username": "ALICE",
            "email": "someone@example.com",
            "password": "Secret123"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"]["details"]["field"], "username");
}

#[sqlx::test]
async fn test_login_success_and_failures_look_alike(pool: PgPool) {
    let (server, state, _dir) = common::create_test_server(pool);
    common::create_user(&state, "alice").await;

    let ok = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": common::PASSWORD }))
        .await;
    ok.assert_status_ok();
    assert!(ok.json::<Value>()["refresh_token"].is_string());

    let wrong_password = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": "Wrong1234" }))
        .await;
    let unknown_user = server
        .post("/auth/login")
        .json(&json!({ "username": "nobody", "password": common::PASSWORD }))
        .await;

    wrong_password.assert_status_unauthorized();
    unknown_user.assert_status_unauthorized();
    assert_eq!(
        wrong_password.json::<Value>()["error"]["message"],
        unknown_user.json::<Value>()["error"]["message"]
    );
}

#[sqlx::test]
async fn test_refresh_rotates_and_old_token_fails(pool: PgPool) {
    let (server, state, _dir) = common::create_test_server(pool);
    let user = common::create_user(&state, "alice").await;
    let first = state.auth_service.issue_session(&user).await.unwrap();

    let rotated = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": first.refresh_token }))
        .await;
    rotated.assert_status_ok();
    let second_refresh = rotated.json::<Value>()["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let replay = server
        .post("/auth/refresh")
        .json(&json!({ "refreshToken": first.refresh_token }))
        .await;
    replay.assert_status_unauthorized();

    let again = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": second_refresh }))
        .await;
    again.assert_status_ok();
}

#[sqlx::test]
async fn test_logout_revokes_refresh_token(pool: PgPool) {
    let (server, state, _dir) = common::create_test_server(pool);
    let user = common::create_user(&state, "alice").await;
    let tokens = state.auth_service.issue_session(&user).await.unwrap();

    server
        .post("/auth/logout")
        .authorization_bearer(&tokens.access_token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": tokens.refresh_token }))
        .await
        .assert_status_unauthorized();
}

#[sqlx::test]
async fn test_protected_route_requires_bearer(pool: PgPool) {
    let (server, state, _dir) = common::create_test_server(pool);
    let user = common::create_user(&state, "alice").await;
    let tokens = state.auth_service.issue_session(&user).await.unwrap();

    let missing = server.get("/users/me").await;
    missing.assert_status_unauthorized();
    assert_eq!(missing.header("www-authenticate"), "Bearer");

    server
        .get("/users/me")
        .authorization_bearer(&tokens.refresh_token)
        .await
        .assert_status_unauthorized();

    let me = server
        .get("/users/me")
        .authorization_bearer(&tokens.access_token)
        .await;
    me.assert_status_ok();
    assert_eq!(me.json::<Value>()["email"], "alice@example.com");
}

#[sqlx::test]
async fn test_delete_account_then_public_lookup_fails(pool: PgPool) {
    let (server, state, _dir) = common::create_test_server(pool);
    let (_user, token) = common::signed_in_user(&state, "alice").await;

    server
        .get("/users/username/alice")
        .await
        .assert_status_ok();

    server
        .delete("/users/me")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/users/username/alice")
        .await
        .assert_status_not_found();
}

#[sqlx::test]
async fn test_rate_limited_response_uses_error_body(pool: PgPool) {
    let (server, state) = common::create_rate_limited_server(pool, 2);
    common::create_user(&state, "alice").await;

    for _ in 0..2 {
        server.get("/users/username/alice").await.assert_status_ok();
    }

    let limited = server.get("/users/username/alice").await;

    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.maybe_header("retry-after").is_some());
    let json = limited.json::<Value>();
    assert_eq!(json["error"]["code"], "rate_limited");
    assert!(json["error"]["details"]["retry_after_secs"].is_u64());
}

#[sqlx::test]
async fn test_login_attempts_are_limited(pool: PgPool) {
    let (server, state) = common::create_rate_limited_server(pool, 100);
    common::create_user(&state, "alice").await;

    for _ in 0..5 {
        server
            .post("/auth/login")
            .json(&json!({ "username": "alice", "password": "Wrong1234" }))
            .await
            .assert_status_unauthorized();
    }

    let limited = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": common::PASSWORD }))
        .await;

    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.json::<Value>()["error"]["code"], "rate_limited");
}

#[sqlx::test]
async fn test_refresh_for_disabled_account_is_forbidden(pool: PgPool) {
    let (server, state, _dir) = common::create_test_server(pool.clone());
    let user = common::create_user(&state, "alice").await;
    let tokens = state.auth_service.issue_session(&user).await.unwrap();

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let response = server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": tokens.refresh_token }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"]["code"], "forbidden");
}
