//! Account request bodies.

use super::extract::{reject, trimmed_len_between, RequestRules};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const PASSWORD_RULE: &str = "Password must be at least 8 characters and contain an uppercase letter, a lowercase letter, a number and a special character (@$!%*?&)";

/// At least 8 characters with lower, upper, digit and one of `@$!%*?&`.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

pub fn is_valid_username(username: &str) -> bool {
    let username = username.trim();
    trimmed_len_between(username, 3, 50)
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    pub username: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    pub password: String,
}

impl RequestRules for RegisterRequest {
    fn check(&self, errors: &mut ValidationErrors) {
        if !is_valid_username(&self.username) {
            reject(
                errors,
                "username",
                "username",
                "Username must be 3-50 characters of letters, numbers and underscores",
            );
        }
        if !is_strong_password(&self.password) {
            reject(errors, "password", "password_strength", PASSWORD_RULE);
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl RequestRules for LoginRequest {}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

impl RequestRules for RefreshRequest {}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl RequestRules for ChangePasswordRequest {
    fn check(&self, errors: &mut ValidationErrors) {
        if !is_strong_password(&self.new_password) {
            reject(errors, "new_password", "password_strength", PASSWORD_RULE);
        }
        if self.confirm_new_password != self.new_password {
            reject(
                errors,
                "confirm_new_password",
                "password_mismatch",
                "Passwords do not match",
            );
        }
    }
}
