//! Invite-code sessions.
//!
//! Exchanging the shared invite code at `POST /login` yields an HS256-signed
//! JWT carried in the [`SESSION_COOKIE`] cookie. The token identifies no one;
//! it only proves the holder knew the code while it was valid.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "rmc_session";

/// Subject stored in every session token.
pub const SESSION_SUBJECT: &str = "invite";

/// Default session lifetime in hours.
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24 * 30;

/// Development-only signing secret. A warning is logged when it is in use.
pub const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

/// Development-only invite code. A warning is logged when it is in use.
pub const DEV_INVITE_CODE: &str = "fly-safe";

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Always [`SESSION_SUBJECT`].
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Configuration for the access gate.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign and verify session tokens.
    pub secret: String,
    /// Session lifetime in hours.
    pub expiry_hours: i64,
    /// Shared code exchanged for a session.
    pub invite_code: String,
}

impl SessionConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var                | Default                |
    /// |------------------------|------------------------|
    /// | `SESSION_SECRET`       | `dev-secret-change-me` |
    /// | `SESSION_EXPIRY_HOURS` | `720`                  |
    /// | `INVITE_CODE`          | `fly-safe`             |
    pub fn from_env() -> Self {
        let secret = std::env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEV_SESSION_SECRET.into());

        let expiry_hours: i64 = std::env::var("SESSION_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_EXPIRY_HOURS.to_string())
            .parse()
            .expect("SESSION_EXPIRY_HOURS must be a valid i64");
        assert!(expiry_hours > 0, "SESSION_EXPIRY_HOURS must be positive");

        let invite_code = std::env::var("INVITE_CODE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEV_INVITE_CODE.into());

        Self {
            secret,
            expiry_hours,
            invite_code,
        }
    }

    /// Session lifetime in seconds, for the cookie `Max-Age`.
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_hours * 60 * 60
    }

    /// Whether `code` matches the configured invite code.
    ///
    /// Surrounding whitespace in the submitted code is ignored.
    pub fn accepts_invite_code(&self, code: &str) -> bool {
        code.trim() == self.invite_code
    }
}

/// Issue a signed session token.
pub fn generate_session_token(config: &SessionConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();

    let claims = SessionClaims {
        sub: SESSION_SUBJECT.to_string(),
        exp: now + config.expiry_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a session token.
///
/// Checks the signature, expiration and subject.
pub fn validate_session_token(
    token: &str,
    config: &SessionConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.sub = Some(SESSION_SUBJECT.to_string());

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
