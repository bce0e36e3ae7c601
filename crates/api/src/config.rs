use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use rmc_core::rating::DEFAULT_MIN_DISPLAY_REVIEWS;
use rmc_core::suggestion::{
    ConsensusPolicy, DEFAULT_CONSENSUS_THRESHOLD, DEFAULT_EXPIRE_DAYS, DEFAULT_WINDOW_DAYS,
};

use crate::auth::session::{SessionConfig, DEV_INVITE_CODE, DEV_SESSION_SECRET};

/// Development-only reviewer pepper. A warning is logged when it is in use.
pub const DEV_REVIEWER_PEPPER: &str = "dev-pepper-change-me";

/// Default hours before the same reviewer may rate a captain again.
pub const DEFAULT_REVIEW_COOLDOWN_HOURS: i64 = 24;

/// Whether the landing page (`GET /`) is open to everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingMode {
    /// Anyone may browse and search captains.
    Public,
    /// The landing page requires a session like every other page.
    Gated,
}

impl LandingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Gated => "gated",
        }
    }
}

impl fmt::Display for LandingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "gated" => Ok(Self::Gated),
            other => Err(format!(
                "Invalid landing mode '{other}'. Must be 'public' or 'gated'"
            )),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. The secrets'
/// defaults are public, so [`ServerConfig::insecure_defaults`] reports which
/// ones are still in use.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session token and invite code settings.
    pub session: SessionConfig,
    /// Server-side secret for deriving reviewer identifiers.
    pub reviewer_pepper: String,
    /// Landing page access mode.
    pub landing_mode: LandingMode,
    /// Mark cookies `Secure` (default: `false`; enable behind HTTPS).
    pub secure_cookies: bool,
    /// Reviews required before averages are shown.
    pub min_display_reviews: usize,
    /// How long a reviewer must wait before rating the same captain again.
    pub review_cooldown: Duration,
    /// Consensus window, threshold and expiry.
    pub consensus: ConsensusPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3000`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `REVIEWER_PEPPER`        | `dev-pepper-change-me`  |
    /// | `LANDING_MODE`           | `public`                |
    /// | `SECURE_COOKIES`         | `false`                 |
    /// | `MIN_DISPLAY_REVIEWS`    | `3`                     |
    /// | `REVIEW_COOLDOWN_HOURS`  | `24`                    |
    /// | `SUGGESTION_WINDOW_DAYS` | `14`                    |
    /// | `CONSENSUS_THRESHOLD`    | `2`                     |
    /// | `SUGGESTION_EXPIRE_DAYS` | `60`                    |
    ///
    /// Session variables are documented on [`SessionConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", 3000u16)
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30u64)
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session = SessionConfig::from_env();

        let reviewer_pepper = std::env::var("REVIEWER_PEPPER")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEV_REVIEWER_PEPPER.into());

        let landing_mode: LandingMode = env_or("LANDING_MODE", LandingMode::Public)
            .parse()
            .unwrap_or_else(|e| panic!("{e}"));

        let secure_cookies: bool = env_or("SECURE_COOKIES", false)
            .parse()
            .expect("SECURE_COOKIES must be 'true' or 'false'");

        let min_display_reviews: usize = env_or("MIN_DISPLAY_REVIEWS", DEFAULT_MIN_DISPLAY_REVIEWS)
            .parse()
            .expect("MIN_DISPLAY_REVIEWS must be a valid usize");

        let review_cooldown_hours: i64 =
            env_or("REVIEW_COOLDOWN_HOURS", DEFAULT_REVIEW_COOLDOWN_HOURS)
                .parse()
                .expect("REVIEW_COOLDOWN_HOURS must be a valid i64");
        assert!(
            review_cooldown_hours >= 0,
            "REVIEW_COOLDOWN_HOURS must not be negative"
        );

        let window_days: i64 = env_or("SUGGESTION_WINDOW_DAYS", DEFAULT_WINDOW_DAYS)
            .parse()
            .expect("SUGGESTION_WINDOW_DAYS must be a valid i64");
        let threshold: usize = env_or("CONSENSUS_THRESHOLD", DEFAULT_CONSENSUS_THRESHOLD)
            .parse()
            .expect("CONSENSUS_THRESHOLD must be a valid usize");
        let expire_days: i64 = env_or("SUGGESTION_EXPIRE_DAYS", DEFAULT_EXPIRE_DAYS)
            .parse()
            .expect("SUGGESTION_EXPIRE_DAYS must be a valid i64");
        let consensus = ConsensusPolicy::from_days(window_days, threshold, expire_days)
            .unwrap_or_else(|e| panic!("Invalid consensus settings: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session,
            reviewer_pepper,
            landing_mode,
            secure_cookies,
            min_display_reviews,
            review_cooldown: Duration::hours(review_cooldown_hours),
            consensus,
        }
    }

    /// Names of secret settings still using their public development default.
    pub fn insecure_defaults(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.session.secret == DEV_SESSION_SECRET {
            names.push("SESSION_SECRET");
        }
        if self.session.invite_code == DEV_INVITE_CODE {
            names.push("INVITE_CODE");
        }
        if self.reviewer_pepper == DEV_REVIEWER_PEPPER {
            names.push("REVIEWER_PEPPER");
        }
        names
    }
}

/// Read `key`, falling back to `default` rendered as a string.
fn env_or(key: &str, default: impl ToString) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
