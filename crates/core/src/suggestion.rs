//! Base/fleet edit suggestions and the consensus policy.
//!
//! A suggestion starts `pending`. It becomes `approved` when enough distinct
//! creators propose the exact same base and fleet for a captain within the
//! consensus window, or `expired` once it has sat pending longer than the
//! expiry window. `rejected` is a valid terminal state that is never set
//! automatically.

use std::collections::HashSet;

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Trailing window within which matching suggestions corroborate each other.
pub const DEFAULT_WINDOW_DAYS: i64 = 14;

/// Distinct creators required to auto-apply a suggestion.
pub const DEFAULT_CONSENSUS_THRESHOLD: usize = 2;

/// Pending suggestions older than this are swept to `expired`.
pub const DEFAULT_EXPIRE_DAYS: i64 = 60;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_EXPIRED: &str = "expired";

/// All valid status values, matching the `edit_suggestions.status` check.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_APPROVED,
    STATUS_REJECTED,
    STATUS_EXPIRED,
];

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of an edit suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl SuggestionStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Approved => STATUS_APPROVED,
            Self::Rejected => STATUS_REJECTED,
            Self::Expired => STATUS_EXPIRED,
        }
    }

    /// Parse from the database string representation.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_APPROVED => Ok(Self::Approved),
            STATUS_REJECTED => Ok(Self::Rejected),
            STATUS_EXPIRED => Ok(Self::Expired),
            other => Err(CoreError::Validation(format!(
                "Invalid suggestion status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: SuggestionStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }

    /// Check a transition, returning the new state.
    pub fn transition(self, next: SuggestionStatus) -> Result<SuggestionStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::Conflict(format!(
                "Suggestion cannot move from '{}' to '{}'",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

impl TryFrom<String> for SuggestionStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// ---------------------------------------------------------------------------
// Consensus policy
// ---------------------------------------------------------------------------

/// Tunables for the consensus engine.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusPolicy {
    /// Trailing window for corroborating suggestions.
    pub window: Duration,
    /// Distinct creators needed within the window.
    pub threshold: usize,
    /// Age after which a pending suggestion is expired.
    pub expiry: Duration,
}

impl Default for ConsensusPolicy {
    fn default() -> Self {
        Self {
            window: Duration::days(DEFAULT_WINDOW_DAYS),
            threshold: DEFAULT_CONSENSUS_THRESHOLD,
            expiry: Duration::days(DEFAULT_EXPIRE_DAYS),
        }
    }
}

impl ConsensusPolicy {
    /// Build a policy from day counts, rejecting nonsensical values.
    pub fn from_days(
        window_days: i64,
        threshold: usize,
        expire_days: i64,
    ) -> Result<Self, CoreError> {
        if window_days <= 0 {
            return Err(CoreError::Validation(
                "Suggestion window must be at least one day".to_string(),
            ));
        }
        if threshold == 0 {
            return Err(CoreError::Validation(
                "Consensus threshold must be at least 1".to_string(),
            ));
        }
        if expire_days < window_days {
            return Err(CoreError::Validation(format!(
                "Suggestion expiry ({expire_days} days) must not be shorter than the \
                 consensus window ({window_days} days)"
            )));
        }
        Ok(Self {
            window: Duration::days(window_days),
            threshold,
            expiry: Duration::days(expire_days),
        })
    }

    /// Oldest creation time that still counts toward consensus at `now`.
    pub fn window_start(&self, now: Timestamp) -> Timestamp {
        now - self.window
    }

    /// Pending suggestions created before this instant are expired at `now`.
    pub fn expiry_cutoff(&self, now: Timestamp) -> Timestamp {
        now - self.expiry
    }

    /// Whether the given creators (duplicates allowed) meet the threshold.
    pub fn reaches_consensus<'a, I>(&self, creators: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        distinct_creators(creators) >= self.threshold
    }
}

/// Count distinct creator identifiers.
///
/// Resubmissions by one creator count once.
pub fn distinct_creators<'a, I>(creators: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    creators.into_iter().collect::<HashSet<_>>().len()
}
