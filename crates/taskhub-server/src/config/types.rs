//! Server configuration types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use taskhub_auth::{SecretString, TokenConfig};

/// Main server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    pub server: ServerBindConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Administrator account created at startup when absent.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBindConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Maximum accepted request body.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// Reported by the health endpoints.
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_environment() -> String {
    "development".to_string()
}

impl ServerBindConfig {
    /// Get socket address.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {addr}: {e}"))
    }

    /// Get request timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerBindConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
            environment: default_environment(),
        }
    }
}

/// Database configuration. Without a URL the server runs on the in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Idle timeout.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// Apply embedded migrations on startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: true,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Access token signing secret.
    #[serde(default)]
    pub jwt_secret: SecretString,
    /// Refresh token signing secret.
    #[serde(default)]
    pub jwt_refresh_secret: SecretString,
    /// Access token expiry.
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiry.
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry_secs: u64,
    /// Issuer claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Audience claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Clock skew tolerated when checking `exp`.
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_access_expiry() -> u64 {
    24 * 60 * 60
}

fn default_refresh_expiry() -> u64 {
    7 * 24 * 60 * 60
}

fn default_issuer() -> String {
    taskhub_auth::DEFAULT_ISSUER.to_string()
}

fn default_audience() -> String {
    taskhub_auth::DEFAULT_AUDIENCE.to_string()
}

impl AuthConfig {
    /// Build the token service configuration.
    pub fn token_config(&self) -> TokenConfig {
        let mut config = TokenConfig::new(
            self.jwt_secret.expose().as_str(),
            self.jwt_refresh_secret.expose().as_str(),
        )
        .with_access_ttl(Duration::from_secs(self.access_token_expiry_secs))
        .with_refresh_ttl(Duration::from_secs(self.refresh_token_expiry_secs));
        config.issuer = self.issuer.clone();
        config.audience = self.audience.clone();
        config.leeway_secs = self.leeway_secs;
        config
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Enable rate limiting.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests per window on the unauthenticated auth routes.
    #[serde(default = "default_auth_requests")]
    pub auth_requests: u32,
    #[serde(default = "default_window")]
    pub auth_window_secs: u64,
    /// Requests per window across the whole API.
    #[serde(default = "default_api_requests")]
    pub api_requests: u32,
    #[serde(default = "default_window")]
    pub api_window_secs: u64,
    /// Key clients on `x-forwarded-for` / `x-real-ip` instead of the peer
    /// address. Only safe behind a proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy: bool,
}

fn default_auth_requests() -> u32 {
    5
}

fn default_api_requests() -> u32 {
    100
}

fn default_window() -> u64 {
    15 * 60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_requests: default_auth_requests(),
            auth_window_secs: default_window(),
            api_requests: default_api_requests(),
            api_window_secs: default_window(),
            trust_proxy: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any origin.
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
    /// Max age for preflight cache.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_age() -> u64 {
    3600
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
            max_age_secs: default_max_age(),
        }
    }
}

/// Administrator seeded into an empty deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

impl ServerConfig {
    /// Configuration with defaults and the given secrets, used by tests and tooling.
    pub fn with_secrets(access: &str, refresh: &str) -> Self {
        Self {
            server: ServerBindConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                jwt_secret: SecretString::from(access),
                jwt_refresh_secret: SecretString::from(refresh),
                access_token_expiry_secs: default_access_expiry(),
                refresh_token_expiry_secs: default_refresh_expiry(),
                issuer: default_issuer(),
                audience: default_audience(),
                leeway_secs: 0,
            },
            rate_limit: RateLimitSettings::default(),
            logging: LoggingConfig::default(),
            cors: CorsConfig::default(),
            bootstrap_admin: None,
        }
    }
}
