//! Captain roster rules: allowed stations and aircraft, name normalization,
//! and employee identifier generation.
//!
//! Base and fleet values arriving from clients are trimmed and upper-cased
//! before they are checked against the fixed allowed sets.

use rand::Rng;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Station codes a captain can be based at.
pub const ALLOWED_BASES: &[&str] = &[
    "ORD", "IAH", "DEN", "EWR", "IAD", "DCA", "SFO", "LAX", "CLE", "LGA", "GUM", "LAS", "MCO",
];

/// Aircraft types a captain can fly.
pub const ALLOWED_FLEETS: &[&str] = &["737", "757", "767", "777", "787", "A319", "A320", "A321"];

/// Prefix for captain employee identifiers.
pub const EMPLOYEE_ID_PREFIX: &str = "CA";

/// Number of random characters after the prefix.
pub const EMPLOYEE_ID_SUFFIX_LENGTH: usize = 8;

/// Maximum length of a captain's display name.
pub const MAX_NAME_LENGTH: usize = 120;

const EMPLOYEE_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Normalize a raw station code and check it against [`ALLOWED_BASES`].
///
/// Returns the canonical (upper-case) code.
pub fn validate_base(raw: &str) -> Result<String, CoreError> {
    let base = raw.trim().to_uppercase();
    if ALLOWED_BASES.contains(&base.as_str()) {
        Ok(base)
    } else {
        Err(CoreError::Validation(format!(
            "Invalid base '{}'. Must be one of: {}",
            raw.trim(),
            ALLOWED_BASES.join(", ")
        )))
    }
}

/// Normalize a raw aircraft type and check it against [`ALLOWED_FLEETS`].
pub fn validate_fleet(raw: &str) -> Result<String, CoreError> {
    let fleet = raw.trim().to_uppercase();
    if ALLOWED_FLEETS.contains(&fleet.as_str()) {
        Ok(fleet)
    } else {
        Err(CoreError::Validation(format!(
            "Invalid fleet '{}'. Must be one of: {}",
            raw.trim(),
            ALLOWED_FLEETS.join(", ")
        )))
    }
}

/// Normalize a captain name: collapse whitespace and capitalize each word.
///
/// `"  jOHN   smith "` becomes `"John Smith"`. Rejects names that are empty
/// after trimming.
pub fn normalize_name(raw: &str) -> Result<String, CoreError> {
    let words: Vec<String> = raw.split_whitespace().map(capitalize).collect();
    if words.is_empty() {
        return Err(CoreError::Validation("Name is required".to_string()));
    }

    let name = words.join(" ");
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Generate a non-PII employee identifier such as `CA-7QZ2M0KD`.
pub fn generate_employee_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..EMPLOYEE_ID_SUFFIX_LENGTH)
        .map(|_| EMPLOYEE_ID_ALPHABET[rng.random_range(0..EMPLOYEE_ID_ALPHABET.len())] as char)
        .collect();
    format!("{EMPLOYEE_ID_PREFIX}-{suffix}")
}
