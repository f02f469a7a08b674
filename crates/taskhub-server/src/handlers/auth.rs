//! Account handlers: registration, login, token refresh and the caller's
//! own profile.

use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::middleware::Auth;
use crate::models::{User, UserView};
use crate::request::{
    normalize_email, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
    ValidJson,
};
use crate::response::{created, message_only, ok};
use crate::state::AppState;
use axum::{extract::State, response::Response};
use serde::Serialize;
use taskhub_auth::{hash_password, verify_password, TokenPair};
use tracing::{info, warn};

#[derive(Serialize)]
struct Session {
    user: UserView,
    tokens: TokenPair,
}

#[derive(Serialize)]
struct Tokens {
    tokens: TokenPair,
}

#[derive(Serialize)]
struct Profile {
    user: UserView,
}

/// Argon2 work runs on the blocking pool.
async fn hash_blocking(password: String) -> ApiResult<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")??;
    Ok(hash)
}

async fn verify_blocking(password: String, hash: String) -> ApiResult<bool> {
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("Password verification task failed")??;
    Ok(matches)
}

fn issue_session(state: &AppState, user: &User) -> ApiResult<Session> {
    let tokens = state.tokens.issue_pair(&user.token_subject())?;
    Ok(Session {
        user: user.view(),
        tokens,
    })
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<Response> {
    let email = normalize_email(&req.email);
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::DuplicateEntry("Email already in use".into()));
    }

    let hash = hash_blocking(req.password).await?;
    let user = state
        .users
        .create(User::new(req.username.trim(), email, hash))
        .await?;
    info!(user_id = %user.id, "User registered");

    let session = issue_session(&state, &user)?;
    Ok(created(session, "User registered successfully"))
}

/// `POST /auth/login`
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Response> {
    let email = normalize_email(&req.email);
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_blocking(req.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::InvalidCredentials);
    }
    if !user.is_active {
        warn!(user_id = %user.id, "Login rejected: account inactive");
        return Err(ApiError::AccountInactive);
    }

    info!(user_id = %user.id, "User logged in");
    let session = issue_session(&state, &user)?;
    Ok(ok(session, "Login successful"))
}

/// `POST /auth/refresh`
///
/// Issues a new pair. The presented refresh token stays valid until it
/// expires.
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> ApiResult<Response> {
    let claims = state.tokens.verify_refresh_token(&req.refresh_token)?;
    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or(ApiError::IdentityNotFound)?;
    if !user.is_active {
        return Err(ApiError::AccountDeactivated);
    }

    let tokens = state.tokens.issue_pair(&user.token_subject())?;
    Ok(ok(Tokens { tokens }, "Token refreshed successfully"))
}

/// `POST /auth/logout`
///
/// Tokens are stateless, so there is nothing to invalidate server-side.
pub async fn logout(Auth(user): Auth) -> Response {
    info!(user_id = %user.id, "User logged out");
    message_only("Logout successful")
}

/// `GET /auth/profile`
pub async fn profile(State(state): State<AppState>, Auth(user): Auth) -> ApiResult<Response> {
    let user = state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or(ApiError::IdentityNotFound)?;
    Ok(ok(
        Profile { user: user.view() },
        "User profile retrieved successfully",
    ))
}

/// `PUT /auth/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    Auth(caller): Auth,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> ApiResult<Response> {
    let mut user = state
        .users
        .find_by_id(caller.id)
        .await?
        .ok_or(ApiError::IdentityNotFound)?;

    if !verify_blocking(req.current_password, user.password_hash.clone()).await? {
        return Err(ApiError::IncorrectPassword);
    }

    user.password_hash = hash_blocking(req.new_password).await?;
    user.touch();
    state.users.update(&user).await?;
    info!(user_id = %user.id, "Password changed");

    Ok(message_only("Password changed successfully"))
}
