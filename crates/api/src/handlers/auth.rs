//! Handlers for the access gate (`/login`, `/logout`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rmc_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::auth::session::{generate_session_token, SESSION_COOKIE};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::access::AccessContext;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub code: String,
}

/// Whether the caller holds a session, and whether the landing page needs one.
#[derive(Debug, Serialize)]
pub struct AccessStatus {
    pub authenticated: bool,
    pub landing_mode: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /login
pub async fn status(
    State(state): State<AppState>,
    access: AccessContext,
) -> Json<DataResponse<AccessStatus>> {
    Json(DataResponse {
        data: AccessStatus {
            authenticated: access.authenticated,
            landing_mode: state.config.landing_mode.as_str(),
        },
    })
}

/// POST /login
///
/// Exchange the shared invite code for a session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<AccessStatus>>)> {
    if !state.config.session.accepts_invite_code(&input.code) {
        tracing::warn!("Login rejected: invalid invite code");
        return Err(AppError::Core(CoreError::Unauthorized("Invalid code.".into())));
    }

    let token = generate_session_token(&state.config.session)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!("Session granted");

    Ok((
        jar.add(session_cookie(token, &state.config)),
        Json(DataResponse {
            data: AccessStatus {
                authenticated: true,
                landing_mode: state.config.landing_mode.as_str(),
            },
        }),
    ))
}

/// POST /logout
///
/// Clear the session cookie. Returns 204 No Content.
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let removal = Cookie::build(SESSION_COOKIE).path("/");
    (jar.remove(removal), StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the session cookie, expiring together with the token inside it.
fn session_cookie(token: String, config: &ServerConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(time::Duration::seconds(config.session.expiry_secs()))
        .build()
}
