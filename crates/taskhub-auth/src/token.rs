//! Access and refresh token lifecycle.
//!
//! Two independent signing domains: access tokens and refresh tokens are
//! signed with different secrets and carry a `typ` claim naming their kind,
//! so a token from one domain never verifies in the other. Tokens are
//! stateless; nothing is persisted server-side.

use crate::{
    error::{AuthError, AuthResult},
    permission::Role,
    secret::SecretString,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskhub_common_core::UserId;
use tracing::{debug, error};

/// Issuer written into every token.
pub const DEFAULT_ISSUER: &str = "task-manager-api";
/// Audience written into every token.
pub const DEFAULT_AUDIENCE: &str = "task-manager-users";

/// Which signing domain a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer credential.
    Access,
    /// Credential exchanged for a new pair.
    Refresh,
}

impl TokenKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID).
    pub sub: UserId,
    /// User email at issuance time.
    pub email: String,
    /// User role at issuance time.
    pub role: Role,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Always [`TokenKind::Access`].
    pub typ: TokenKind,
}

/// Claims carried by a refresh token. Only the subject is embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user ID).
    pub sub: UserId,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Always [`TokenKind::Refresh`].
    pub typ: TokenKind,
}

trait KindedClaims {
    fn kind(&self) -> TokenKind;
}

impl KindedClaims for AccessClaims {
    fn kind(&self) -> TokenKind {
        self.typ
    }
}

impl KindedClaims for RefreshClaims {
    fn kind(&self) -> TokenKind {
        self.typ
    }
}

/// Identity fields embedded into an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    /// User ID.
    pub id: UserId,
    /// Email.
    pub email: String,
    /// Role.
    pub role: Role,
}

/// Access + refresh token pair handed out at login, registration and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Longer-lived refresh token.
    pub refresh_token: String,
}

/// Signing configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret for the access-token domain.
    pub access_secret: SecretString,
    /// Secret for the refresh-token domain.
    pub refresh_secret: SecretString,
    /// Access token lifetime.
    pub access_ttl: Duration,
    /// Refresh token lifetime.
    pub refresh_ttl: Duration,
    /// Issuer claim.
    pub issuer: String,
    /// Audience claim.
    pub audience: String,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

impl TokenConfig {
    /// Config with the default lifetimes (24h access, 7d refresh).
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: SecretString::new(access_secret.into()),
            refresh_secret: SecretString::new(refresh_secret.into()),
            access_ttl: Duration::from_secs(24 * 60 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            leeway_secs: 0,
        }
    }

    /// Override the access token lifetime.
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Override the refresh token lifetime.
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

struct SigningDomain {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningDomain {
    fn new(secret: &SecretString, ttl: Duration, name: &'static str) -> AuthResult<Self> {
        if secret.is_blank() {
            return Err(AuthError::ConfigurationMissing(name));
        }
        let bytes = secret.expose().as_bytes();
        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        })
    }
}

/// Issues and verifies tokens for both signing domains.
pub struct TokenService {
    access: SigningDomain,
    refresh: SigningDomain,
    issuer: String,
    audience: String,
    validation: Validation,
}

impl TokenService {
    /// Build the service. Fails when either secret is missing or both
    /// domains share one secret.
    pub fn new(config: TokenConfig) -> AuthResult<Self> {
        let access = SigningDomain::new(&config.access_secret, config.access_ttl, "JWT_SECRET")?;
        let refresh = SigningDomain::new(
            &config.refresh_secret,
            config.refresh_ttl,
            "JWT_REFRESH_SECRET",
        )?;
        if config.access_secret.expose() == config.refresh_secret.expose() {
            return Err(AuthError::SharedSigningSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = config.leeway_secs;

        Ok(Self {
            access,
            refresh,
            issuer: config.issuer,
            audience: config.audience,
            validation,
        })
    }

    /// Lifetime of issued access tokens.
    pub fn access_ttl(&self) -> Duration {
        self.access.ttl
    }

    /// Sign an access token for `subject`.
    pub fn issue_access_token(&self, subject: &TokenSubject) -> AuthResult<String> {
        let claims = self.access_claims(subject, Utc::now().timestamp());
        self.sign(&claims, &self.access.encoding)
    }

    /// Sign a refresh token for `user_id`.
    pub fn issue_refresh_token(&self, user_id: UserId) -> AuthResult<String> {
        let claims = self.refresh_claims(user_id, Utc::now().timestamp());
        self.sign(&claims, &self.refresh.encoding)
    }

    /// Issue a fresh access + refresh pair.
    pub fn issue_pair(&self, subject: &TokenSubject) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(subject)?,
            refresh_token: self.issue_refresh_token(subject.id)?,
        })
    }

    /// Verify an access token and return its claims.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessClaims> {
        self.verify(token, &self.access.decoding, TokenKind::Access)
    }

    /// Verify a refresh token and return its claims.
    pub fn verify_refresh_token(&self, token: &str) -> AuthResult<RefreshClaims> {
        self.verify(token, &self.refresh.decoding, TokenKind::Refresh)
    }

    fn access_claims(&self, subject: &TokenSubject, now: i64) -> AccessClaims {
        AccessClaims {
            sub: subject.id,
            email: subject.email.clone(),
            role: subject.role,
            iat: now,
            exp: now + self.access.ttl.as_secs() as i64,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            typ: TokenKind::Access,
        }
    }

    fn refresh_claims(&self, user_id: UserId, now: i64) -> RefreshClaims {
        RefreshClaims {
            sub: user_id,
            iat: now,
            exp: now + self.refresh.ttl.as_secs() as i64,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            typ: TokenKind::Refresh,
        }
    }

    fn sign<T: Serialize>(&self, claims: &T, key: &EncodingKey) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, key).map_err(|err| {
            error!(error = %err, "token signing failed");
            AuthError::TokenSigning
        })
    }

    fn verify<T: serde::de::DeserializeOwned + KindedClaims>(
        &self,
        token: &str,
        key: &DecodingKey,
        expected: TokenKind,
    ) -> AuthResult<T> {
        let claims = decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!(domain = expected.as_str(), reason = ?err.kind(), "token rejected");
                AuthError::InvalidOrExpiredToken
            })?;
        if claims.kind() != expected {
            debug!(
                domain = expected.as_str(),
                presented = claims.kind().as_str(),
                "token rejected: wrong kind"
            );
            return Err(AuthError::InvalidOrExpiredToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new(
            "access-secret-for-tests-0123456789",
            "refresh-secret-for-tests-9876543210",
        ))
        .unwrap()
    }

    fn subject(role: Role) -> TokenSubject {
        TokenSubject {
            id: UserId::new(),
            email: "ada@example.com".into(),
            role,
        }
    }

    #[test]
    fn test_access_round_trip_keeps_identity() {
        let tokens = service();
        let subject = subject(Role::Admin);

        let token = tokens.issue_access_token(&subject).unwrap();
        let claims = tokens.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, subject.id);
        assert_eq!(claims.email, subject.email);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, DEFAULT_ISSUER);
        assert_eq!(claims.aud, DEFAULT_AUDIENCE);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_refresh_round_trip_keeps_subject() {
        let tokens = service();
        let id = UserId::new();

        let token = tokens.issue_refresh_token(id).unwrap();
        let claims = tokens.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_expired_access_token_is_rejected() {
        let tokens = service();
        let issued = Utc::now().timestamp() - 2 * 24 * 60 * 60;
        let claims = tokens.access_claims(&subject(Role::User), issued);
        let token = tokens.sign(&claims, &tokens.access.encoding).unwrap();

        assert_eq!(
            tokens.verify_access_token(&token),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn test_expired_refresh_token_is_rejected() {
        let tokens = service();
        let issued = Utc::now().timestamp() - 8 * 24 * 60 * 60;
        let claims = tokens.refresh_claims(UserId::new(), issued);
        let token = tokens.sign(&claims, &tokens.refresh.encoding).unwrap();

        assert_eq!(
            tokens.verify_refresh_token(&token),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn test_domains_do_not_cross() {
        let tokens = service();
        let subject = subject(Role::User);

        let refresh = tokens.issue_refresh_token(subject.id).unwrap();
        assert_eq!(
            tokens.verify_access_token(&refresh),
            Err(AuthError::InvalidOrExpiredToken)
        );

        let access = tokens.issue_access_token(&subject).unwrap();
        assert_eq!(
            tokens.verify_refresh_token(&access),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn test_equal_secrets_are_rejected() {
        assert!(matches!(
            TokenService::new(TokenConfig::new("same-secret", "same-secret")),
            Err(AuthError::SharedSigningSecret)
        ));
    }

    #[test]
    fn test_kind_claim_separates_domains_under_one_key() {
        let tokens = service();
        let subject = subject(Role::User);

        // Access claims signed with the refresh key still fail refresh verification.
        let access_claims = tokens.access_claims(&subject, Utc::now().timestamp());
        let forged = tokens.sign(&access_claims, &tokens.refresh.encoding).unwrap();
        assert_eq!(
            tokens.verify_refresh_token(&forged),
            Err(AuthError::InvalidOrExpiredToken)
        );

        let mut refresh_claims = tokens.refresh_claims(subject.id, Utc::now().timestamp());
        let forged = tokens.sign(&refresh_claims, &tokens.access.encoding).unwrap();
        assert_eq!(
            tokens.verify_access_token(&forged),
            Err(AuthError::InvalidOrExpiredToken)
        );

        refresh_claims.typ = TokenKind::Access;
        let relabelled = tokens.sign(&refresh_claims, &tokens.refresh.encoding).unwrap();
        assert!(tokens.verify_refresh_token(&relabelled).is_err());
    }

    #[test]
    fn test_kind_claim_is_serialized() {
        let tokens = service();
        let claims = tokens.refresh_claims(UserId::new(), 0);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["typ"], "refresh");
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let ours = service();
        let theirs = TokenService::new(TokenConfig::new("other-access", "other-refresh")).unwrap();

        let token = theirs.issue_access_token(&subject(Role::Admin)).unwrap();
        assert!(ours.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let tokens = service();
        let mut claims = tokens.access_claims(&subject(Role::User), Utc::now().timestamp());
        claims.aud = "someone-else".into();
        let token = tokens.sign(&claims, &tokens.access.encoding).unwrap();

        assert!(tokens.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let tokens = service();
        let token = tokens.issue_access_token(&subject(Role::User)).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "AAAA";
        let tampered = parts.join(".");

        assert!(tokens.verify_access_token(&tampered).is_err());
        assert!(tokens.verify_access_token("not-a-jwt").is_err());
        assert!(tokens.verify_access_token("").is_err());
    }

    #[test]
    fn test_missing_secrets_are_configuration_errors() {
        assert!(matches!(
            TokenService::new(TokenConfig::new("", "refresh")),
            Err(AuthError::ConfigurationMissing("JWT_SECRET"))
        ));
        assert!(matches!(
            TokenService::new(TokenConfig::new("access", "  ")),
            Err(AuthError::ConfigurationMissing("JWT_REFRESH_SECRET"))
        ));
    }

    #[test]
    fn test_pair_contains_both_domains() {
        let tokens = service();
        let subject = subject(Role::User);
        let pair = tokens.issue_pair(&subject).unwrap();

        assert!(tokens.verify_access_token(&pair.access_token).is_ok());
        assert_eq!(
            tokens.verify_refresh_token(&pair.refresh_token).unwrap().sub,
            subject.id
        );
    }
}
