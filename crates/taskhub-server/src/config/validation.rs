//! Configuration validation.

use super::types::ServerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not configured")]
    MissingJwtSecret,

    #[error("JWT_REFRESH_SECRET is not configured")]
    MissingRefreshSecret,

    #[error("JWT_SECRET and JWT_REFRESH_SECRET must differ")]
    SharedSecrets,

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Token expiry must be greater than zero")]
    InvalidTokenExpiry,

    #[error("Invalid rate limit configuration")]
    InvalidRateLimit,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

/// Validate server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let auth = &config.auth;
    if auth.jwt_secret.is_blank() {
        errors.push(ConfigError::MissingJwtSecret);
    }
    if auth.jwt_refresh_secret.is_blank() {
        errors.push(ConfigError::MissingRefreshSecret);
    }
    if !auth.jwt_secret.is_blank() && auth.jwt_secret == auth.jwt_refresh_secret {
        errors.push(ConfigError::SharedSecrets);
    }
    if auth.access_token_expiry_secs == 0 || auth.refresh_token_expiry_secs == 0 {
        errors.push(ConfigError::InvalidTokenExpiry);
    }

    if let Some(url) = &config.database.url {
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            errors.push(ConfigError::InvalidDatabaseUrl);
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort(0));
    }

    let limits = &config.rate_limit;
    if limits.enabled
        && (limits.auth_requests == 0
            || limits.api_requests == 0
            || limits.auth_window_secs == 0
            || limits.api_window_secs == 0)
    {
        errors.push(ConfigError::InvalidRateLimit);
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigError::InvalidLogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
