//! Session-cookie access extractors for Axum handlers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use rmc_core::error::CoreError;

use crate::auth::session::{validate_session_token, SESSION_COOKIE};
use crate::config::LandingMode;
use crate::error::AppError;
use crate::state::AppState;

/// Per-request access state derived from the `rmc_session` cookie.
///
/// Never rejects: a missing, expired or forged token simply yields
/// `authenticated: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessContext {
    pub authenticated: bool,
}

impl AccessContext {
    /// Derive the access state from request cookies.
    pub fn from_jar(jar: &CookieJar, state: &AppState) -> Self {
        let authenticated = jar
            .get(SESSION_COOKIE)
            .is_some_and(|cookie| {
                validate_session_token(cookie.value(), &state.config.session).is_ok()
            });
        Self { authenticated }
    }
}

impl FromRequestParts<AppState> for AccessContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self::from_jar(&jar, state))
    }
}

/// Requires a valid session. Rejects with 401 Unauthorized otherwise.
///
/// ```ignore
/// async fn gated(_access: RequireAccess) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAccess(pub AccessContext);

impl FromRequestParts<AppState> for RequireAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let access = AccessContext::from_jar(&jar, state);
        if !access.authenticated {
            return Err(access_required());
        }
        Ok(RequireAccess(access))
    }
}

/// Access to the landing page, which depends on [`LandingMode`].
///
/// In `public` mode every request passes; in `gated` mode this behaves like
/// [`RequireAccess`].
pub struct LandingAccess(pub AccessContext);

impl FromRequestParts<AppState> for LandingAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let access = AccessContext::from_jar(&jar, state);
        if state.config.landing_mode == LandingMode::Gated && !access.authenticated {
            return Err(access_required());
        }
        Ok(LandingAccess(access))
    }
}

fn access_required() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Enter the access code to continue".into(),
    ))
}
