//! Registration, login, refresh and profile flows.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_user_and_tokens() {
    let app = TestApp::new();
    let res = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "alice", "email": "Alice@Example.com", "password": PASSWORD }),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["message"], "User registered successfully");
    let user = &res.data()["user"];
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["role"], "user");
    assert!(user.get("passwordHash").is_none());
    assert!(res.data()["tokens"]["accessToken"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.register("alice").await;

    let res = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "alice2", "email": "alice@example.com", "password": PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.error_code(), "duplicate_entry");
}

#[tokio::test]
async fn test_register_validation_reports_fields() {
    let app = TestApp::new();
    let res = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({ "username": "a", "email": "nope", "password": "weak" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_code(), "validation_error");
    let fields = &res.body["error"]["fields"];
    assert!(fields["username"].is_array());
    assert!(fields["email"].is_array());
    assert!(fields["password"].is_array());
}

#[tokio::test]
async fn test_login_and_wrong_password() {
    let app = TestApp::new();
    let account = app.register("bob").await;

    let res = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "email": account.email, "password": PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["user"]["username"], "bob");

    let wrong = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "email": account.email, "password": "Wrong-passw0rd" }),
        )
        .await;
    let unknown = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "email": "ghost@example.com", "password": PASSWORD }),
        )
        .await;
    for res in [wrong, unknown] {
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.error_code(), "invalid_credentials");
    }
}

#[tokio::test]
async fn test_profile_requires_valid_token() {
    let app = TestApp::new();
    let account = app.register("carol").await;

    let res = app.get("/api/v1/auth/profile", &account.access_token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["user"]["id"], account.id.as_str());

    let missing = app
        .request(Method::GET, "/api/v1/auth/profile", None, None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app.get("/api/v1/auth/profile", "not.a.token").await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.error_code(), "invalid_token");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new();
    let account = app.register("dave").await;

    let res = app.get("/api/v1/auth/profile", &account.refresh_token).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .post(
            "/api/v1/auth/refresh",
            None,
            json!({ "refreshToken": account.access_token }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let app = TestApp::new();
    let account = app.register("erin").await;

    let res = app
        .post(
            "/api/v1/auth/refresh",
            None,
            json!({ "refreshToken": account.refresh_token }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let access = res.data()["tokens"]["accessToken"].as_str().unwrap();

    let profile = app.get("/api/v1/auth/profile", access).await;
    assert_eq!(profile.status, StatusCode::OK);

    let missing = app.post("/api/v1/auth/refresh", None, json!({})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let account = app.register("frank").await;
    let new_password = "N3w-Passw0rd!";

    let wrong = app
        .request(
            Method::PUT,
            "/api/v1/auth/change-password",
            Some(&account.access_token),
            Some(json!({
                "currentPassword": "Not-my-passw0rd",
                "newPassword": new_password,
                "confirmNewPassword": new_password
            })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.error_code(), "incorrect_password");

    let res = app
        .request(
            Method::PUT,
            "/api/v1/auth/change-password",
            Some(&account.access_token),
            Some(json!({
                "currentPassword": PASSWORD,
                "newPassword": new_password,
                "confirmNewPassword": new_password
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let old = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "email": account.email, "password": PASSWORD }),
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);

    let new = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({ "email": account.email, "password": new_password }),
        )
        .await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_is_acknowledged() {
    let app = TestApp::new();
    let account = app.register("gina").await;

    let res = app
        .request(
            Method::POST,
            "/api/v1/auth/logout",
            Some(&account.access_token),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Logout successful");
}

#[tokio::test]
async fn test_health_and_banner() {
    let app = TestApp::new();

    let root = app.request(Method::GET, "/", None, None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body["message"], "Task Manager API");

    let health = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(health.body["message"], "Server is healthy");
    assert_eq!(health.body["environment"], "development");

    let v1 = app.request(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(v1.body["message"], "API v1 is running");

    let v2 = app.request(Method::GET, "/api/v2/health", None, None).await;
    assert_eq!(v2.body["message"], "API v2 is running");

    let missing = app.request(Method::GET, "/api/v1/nowhere", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error_code(), "not_found");
}
