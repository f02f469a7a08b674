//! Configuration loading utilities.

use super::types::ServerConfig;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Plain environment variables honoured on top of the prefixed ones, so a
/// `.env` written for older deployments keeps working.
const LEGACY_VARS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("JWT_SECRET", "auth.jwt_secret"),
    ("JWT_REFRESH_SECRET", "auth.jwt_refresh_secret"),
];

const LEGACY_DURATIONS: &[(&str, &str)] = &[
    ("JWT_EXPIRE", "auth.access_token_expiry_secs"),
    ("JWT_REFRESH_EXPIRE", "auth.refresh_token_expiry_secs"),
];

/// Load configuration from various sources.
pub struct ConfigLoader {
    config_path: Option<String>,
    env_prefix: String,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: "TASKHUB".to_string(),
            env: None,
        }
    }

    /// Set config file path.
    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Read variables from `env` instead of the process environment.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    fn var(&self, key: &str) -> Option<String> {
        match &self.env {
            Some(env) => env.get(key).cloned(),
            None => std::env::var(key).ok(),
        }
        .filter(|value| !value.is_empty())
    }

    /// Load configuration.
    pub fn load(&self) -> Result<ServerConfig> {
        let mut builder = config::Config::builder();

        // Add default values
        builder = builder.add_source(config::File::from_str(
            include_str!("defaults.toml"),
            config::FileFormat::Toml,
        ));

        // Add config file if specified
        if let Some(path) = &self.config_path {
            if Path::new(path).exists() {
                info!(path = %path, "Loading config file");
                builder = builder.add_source(config::File::with_name(path));
            }
        }

        // Add environment variables
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true)
                .source(self.env.clone()),
        );

        for (var, key) in LEGACY_VARS {
            builder = builder
                .set_override_option(*key, self.var(var))
                .with_context(|| format!("Failed to apply {var}"))?;
        }

        for (var, key) in LEGACY_DURATIONS {
            let secs = match self.var(var) {
                Some(raw) => Some(parse_duration_secs(var, &raw)?),
                None => None,
            };
            builder = builder
                .set_override_option(*key, secs)
                .with_context(|| format!("Failed to apply {var}"))?;
        }

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts humantime durations (`24h`, `7d`, `90m`) or plain seconds.
fn parse_duration_secs(var: &str, raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(secs);
    }
    let duration = humantime::parse_duration(raw)
        .with_context(|| format!("{var} is not a valid duration: {raw}"))?;
    i64::try_from(duration.as_secs()).with_context(|| format!("{var} is too large"))
}

/// Load configuration from environment.
pub fn load_config() -> Result<ServerConfig> {
    let config_path = std::env::var("CONFIG_PATH").ok();

    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.with_config_path(path);
    }

    loader.load()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_load_without_secrets() {
        let config = ConfigLoader::new().with_env(HashMap::new()).load().unwrap();

        assert_eq!(config.server.port, 8000);
        assert!(config.auth.jwt_secret.is_blank());
        assert_eq!(config.auth.access_token_expiry_secs, 86_400);
        assert_eq!(config.auth.refresh_token_expiry_secs, 604_800);
        assert_eq!(config.rate_limit.auth_requests, 5);
        assert!(!config.rate_limit.trust_proxy);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_legacy_variables_override() {
        let config = ConfigLoader::new()
            .with_env(env(&[
                ("PORT", "5000"),
                ("JWT_SECRET", "access-secret"),
                ("JWT_REFRESH_SECRET", "refresh-secret"),
                ("JWT_EXPIRE", "1h"),
                ("JWT_REFRESH_EXPIRE", "2d"),
                ("DATABASE_URL", "postgres://localhost/taskhub"),
            ]))
            .load()
            .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.jwt_secret.expose(), "access-secret");
        assert_eq!(config.auth.jwt_refresh_secret.expose(), "refresh-secret");
        assert_eq!(config.auth.access_token_expiry_secs, 3600);
        assert_eq!(config.auth.refresh_token_expiry_secs, 172_800);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/taskhub")
        );
    }

    #[test]
    fn test_prefixed_variables() {
        let config = ConfigLoader::new()
            .with_env(env(&[
                ("TASKHUB__LOGGING__LEVEL", "debug"),
                ("TASKHUB__RATE_LIMIT__ENABLED", "false"),
            ]))
            .load()
            .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(!config.rate_limit.enabled);
    }

    #[test]
    fn test_bad_duration_is_rejected() {
        let result = ConfigLoader::new()
            .with_env(env(&[("JWT_EXPIRE", "forever")]))
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("X", "24h").unwrap(), 86_400);
        assert_eq!(parse_duration_secs("X", "7d").unwrap(), 604_800);
        assert_eq!(parse_duration_secs("X", "120").unwrap(), 120);
    }
}
