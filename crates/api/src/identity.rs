//! Reviewer identity extractor.
//!
//! Reads the client's reviewer token from the `rmc_reviewer` cookie, minting
//! one when it is missing or unusable, and derives the peppered reviewer
//! hash. Handlers must return [`ReviewerIdentity::jar`] in their response so
//! a freshly minted token reaches the client; the jar only emits
//! `Set-Cookie` when a token was minted.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rmc_core::reviewer::{
    is_usable_token, mint_token, reviewer_hash, REVIEWER_COOKIE, REVIEWER_COOKIE_MAX_AGE_DAYS,
};

use crate::state::AppState;

/// The pseudonymous reviewer behind a request.
#[derive(Debug)]
pub struct ReviewerIdentity {
    /// `HMAC-SHA256(pepper, token)`, truncated. Never shown to clients.
    pub hash: String,
    /// Cookie jar to return with the response.
    pub jar: CookieJar,
    /// Whether the token was minted for this request.
    pub minted: bool,
}

impl FromRequestParts<AppState> for ReviewerIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let pepper = &state.config.reviewer_pepper;

        let existing = jar
            .get(REVIEWER_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .filter(|token| is_usable_token(token));

        let identity = match existing {
            Some(token) => Self {
                hash: reviewer_hash(pepper, &token),
                jar,
                minted: false,
            },
            None => {
                let token = mint_token();
                let hash = reviewer_hash(pepper, &token);
                tracing::debug!("Minted reviewer token");
                Self {
                    hash,
                    jar: jar.add(reviewer_cookie(token, state.config.secure_cookies)),
                    minted: true,
                }
            }
        };
        Ok(identity)
    }
}

/// Build the long-lived reviewer cookie.
pub fn reviewer_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((REVIEWER_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(REVIEWER_COOKIE_MAX_AGE_DAYS))
        .build()
}
