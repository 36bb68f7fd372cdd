//! The cache/staleness decision for stored profiles.
//!
//! The policy is a single pure function so it can be tested without a
//! store or a clock: callers pass the stored document (if any) and the
//! current time, and receive a tagged decision. First match wins, in the
//! order listed on [`RecomputeReason`].

use chrono::{DateTime, TimeDelta, Utc};

use crate::profile::TasteProfile;

/// Hours a complete profile stays fresh before recomputation.
pub const FRESHNESS_WINDOW_HOURS: i64 = 6;

/// Why a stored profile cannot be served as-is.
///
/// Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeReason {
    /// No stored profile exists; compute for the first time.
    Missing,
    /// The stored document's `user_id` differs from the requested one.
    /// Treated as repairable corruption, never served or surfaced.
    Corrupt,
    /// The caller forced a refresh.
    Forced,
    /// The stored profile has no contributing records.
    Empty,
    /// Confidence has not yet saturated; keep recomputing so the profile
    /// accumulates as fast as data arrives.
    Building,
    /// Confidence is saturated but the last computation is older than the
    /// freshness window.
    Stale,
}

/// Outcome of the refresh decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Serve the stored profile unchanged.
    UseCached,
    /// Run a full recomputation for the stated reason.
    Recompute(RecomputeReason),
}

/// Decide whether a stored profile can be served or must be recomputed.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use palate_core::{RecomputeReason, RefreshDecision, TasteProfile, decide_refresh};
///
/// let now = Utc::now();
/// assert_eq!(
///     decide_refresh(None, "user-1", false, now),
///     RefreshDecision::Recompute(RecomputeReason::Missing),
/// );
///
/// let empty = TasteProfile::empty("user-1", now);
/// assert_eq!(
///     decide_refresh(Some(&empty), "user-1", false, now),
///     RefreshDecision::Recompute(RecomputeReason::Empty),
/// );
/// ```
#[must_use]
pub fn decide_refresh(
    stored: Option<&TasteProfile>,
    user_id: &str,
    force: bool,
    now: DateTime<Utc>,
) -> RefreshDecision {
    let Some(profile) = stored else {
        return RefreshDecision::Recompute(RecomputeReason::Missing);
    };
    if profile.user_id != user_id {
        return RefreshDecision::Recompute(RecomputeReason::Corrupt);
    }
    if force {
        return RefreshDecision::Recompute(RecomputeReason::Forced);
    }
    if profile.data_points == 0 {
        return RefreshDecision::Recompute(RecomputeReason::Empty);
    }
    if !profile.is_complete() {
        return RefreshDecision::Recompute(RecomputeReason::Building);
    }
    if now - profile.last_computed > TimeDelta::hours(FRESHNESS_WINDOW_HOURS) {
        return RefreshDecision::Recompute(RecomputeReason::Stale);
    }
    RefreshDecision::UseCached
}
