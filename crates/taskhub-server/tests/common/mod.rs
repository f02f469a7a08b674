//! Shared harness for the HTTP integration tests.
//!
//! Every test gets its own in-memory state and drives the real router with
//! `oneshot`, so no socket or database is involved.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use taskhub_auth::Role;
use taskhub_common_core::UserId;
use taskhub_server::{routes::create_router, AppState, ServerConfig};
use tower::ServiceExt;

pub const PASSWORD: &str = "Passw0rd!";

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::with_secrets(
        "access-secret-for-integration-tests",
        "refresh-secret-for-integration-tests",
    );
    config.rate_limit.enabled = false;
    config
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }
}

/// A registered account and its tokens.
pub struct Account {
    pub id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let state = AppState::in_memory(&config).expect("state");
        let router = create_router(state.clone());
        Self { state, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    /// Drive an already built request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn register(&self, username: &str) -> Account {
        let email = format!("{username}@example.com");
        let res = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({ "username": username, "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);

        let data = res.data();
        Account {
            id: data["user"]["id"].as_str().expect("id").to_string(),
            email,
            access_token: data["tokens"]["accessToken"].as_str().expect("access").to_string(),
            refresh_token: data["tokens"]["refreshToken"].as_str().expect("refresh").to_string(),
        }
    }

    /// Register an account and promote it straight through the store.
    pub async fn register_admin(&self, username: &str) -> Account {
        let account = self.register(username).await;
        self.set_role(&account.id, Role::Admin).await;
        account
    }

    pub async fn set_role(&self, id: &str, role: Role) {
        let id = UserId::parse(id).expect("user id");
        let mut user = self
            .state
            .users
            .find_by_id(id)
            .await
            .expect("store")
            .expect("user");
        user.role = role;
        self.state.users.update(&user).await.expect("update");
    }

    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let res = self.post("/api/v1/tasks", Some(token), body).await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
        res.data().clone()
    }
}
