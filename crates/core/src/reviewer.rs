//! Pseudonymous reviewer identifiers.
//!
//! Each client holds a random token in a long-lived cookie. The server never
//! stores that token; it stores only a keyed hash of it, computed with a
//! server-side secret (the "pepper"). The resulting identifier is stable for
//! the token's lifetime and cannot be reversed without the pepper. It is used
//! for review cooldowns and suggestion de-duplication, never for display.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Name of the cookie that carries the reviewer token.
pub const REVIEWER_COOKIE: &str = "rmc_reviewer";

/// Reviewer cookie lifetime: two years.
pub const REVIEWER_COOKIE_MAX_AGE_DAYS: i64 = 365 * 2;

/// Number of hex characters kept from the HMAC digest.
pub const REVIEWER_HASH_LENGTH: usize = 32;

/// Longest token accepted from a client. Anything longer is replaced.
pub const MAX_TOKEN_LENGTH: usize = 128;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Mint a fresh client token.
pub fn mint_token() -> String {
    Uuid::new_v4().to_string()
}

/// Whether a token read back from a client is usable.
///
/// Tokens are opaque, but an empty or absurdly long value is treated as
/// absent so a fresh one gets minted.
pub fn is_usable_token(token: &str) -> bool {
    !token.trim().is_empty() && token.len() <= MAX_TOKEN_LENGTH
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Derive the reviewer identifier for `token` under `pepper`.
///
/// Returns the first [`REVIEWER_HASH_LENGTH`] lowercase hex characters of
/// `HMAC-SHA256(pepper, token)`.
pub fn reviewer_hash(pepper: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(pepper.as_bytes()).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex.truncate(REVIEWER_HASH_LENGTH);
    hex
}
