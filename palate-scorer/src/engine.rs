//! Fetches the five signal feeds, folds them, and manages the cached
//! profile document.

use chrono::Utc;
use palate_core::{
    ProfileStore, RecomputeReason, RefreshDecision, SignalSources, SourceError, TasteProfile,
    decide_refresh,
};

use crate::accumulate::ProfileAccumulator;
use crate::error::EngineError;
use crate::weights::{ACTIVITY_FETCH_LIMIT, SignalWeights};

/// Computes, caches, and serves taste profiles.
///
/// The engine is generic over its collaborators: [`SignalSources`]
/// supplies the raw feeds and [`ProfileStore`] persists the computed
/// document. It holds no per-user mutable state, so a single instance
/// can be shared across threads; when two threads compute the same user
/// concurrently, the store's last write wins and both results are valid
/// for their fetch time.
pub struct TasteProfileEngine<S, P> {
    sources: S,
    store: P,
    weights: SignalWeights,
}

impl<S: SignalSources, P: ProfileStore> TasteProfileEngine<S, P> {
    /// Create an engine with the default signal weights.
    #[must_use]
    pub fn new(sources: S, store: P) -> Self {
        Self::with_weights(sources, store, SignalWeights::default())
    }

    /// Create an engine with custom signal weights.
    #[must_use]
    pub const fn with_weights(sources: S, store: P, weights: SignalWeights) -> Self {
        Self {
            sources,
            store,
            weights,
        }
    }

    /// Serve the profile for `user_id`, recomputing when the cached
    /// document cannot be served.
    ///
    /// `force` skips the freshness check and always recomputes. A stored
    /// document whose `user_id` disagrees with the requested one is
    /// recomputed in place rather than surfaced as an error.
    ///
    /// # Errors
    /// Returns [`EngineError::Compute`] when the store fails to read the
    /// cached document or to persist a recomputed one.
    pub fn get(&self, user_id: &str, force: bool) -> Result<TasteProfile, EngineError> {
        let stored = self
            .store
            .get(user_id)
            .map_err(|source| EngineError::compute(user_id, source))?;
        let decision = decide_refresh(stored.as_ref(), user_id, force, Utc::now());
        if let (RefreshDecision::UseCached, Some(profile)) = (decision, stored) {
            log::debug!("serving cached taste profile for {user_id}");
            return Ok(profile);
        }
        if let RefreshDecision::Recompute(reason) = decision {
            if reason == RecomputeReason::Corrupt {
                log::warn!("stored profile for {user_id} has a mismatched user id, recomputing");
            } else {
                log::debug!("recomputing taste profile for {user_id}: {reason:?}");
            }
        }
        self.compute(user_id)
    }

    /// Recompute the profile for `user_id` from all five feeds and
    /// persist it.
    ///
    /// # Errors
    /// Returns [`EngineError::Compute`] when persisting fails. Feed
    /// failures never error; see [`Self::compute_with_diagnostics`].
    pub fn compute(&self, user_id: &str) -> Result<TasteProfile, EngineError> {
        self.compute_with_diagnostics(user_id)
            .map(|(profile, _)| profile)
    }

    /// Recompute the profile and report which feeds failed.
    ///
    /// Each feed that fails contributes nothing to the profile and adds
    /// one [`SourceError`] to the returned diagnostics; the computation
    /// itself always proceeds. A caller that needs to distinguish "user
    /// has no history" from "every feed was down" inspects the
    /// diagnostics.
    ///
    /// # Errors
    /// Returns [`EngineError::Compute`] only when the store rejects the
    /// computed document.
    pub fn compute_with_diagnostics(
        &self,
        user_id: &str,
    ) -> Result<(TasteProfile, Vec<SourceError>), EngineError> {
        let mut diagnostics = Vec::new();
        let food_logs = degrade(self.sources.food_logs(user_id), &mut diagnostics);
        let saved = degrade(self.sources.saved_restaurants(user_id), &mut diagnostics);
        let liked = degrade(self.sources.liked_posts(user_id), &mut diagnostics);
        let clicks = degrade(self.sources.restaurant_clicks(user_id), &mut diagnostics);
        let activity = degrade(
            self.sources.recent_activity(user_id, ACTIVITY_FETCH_LIMIT),
            &mut diagnostics,
        );

        // Positive sources first; activity last so negative signals and
        // dwell times find the entries they adjust.
        let mut accumulator = ProfileAccumulator::new(user_id, self.weights);
        for log in &food_logs {
            accumulator.add_food_log(log);
        }
        for record in &saved {
            accumulator.add_saved_restaurant(record);
        }
        for post in &liked {
            accumulator.add_liked_post(post);
        }
        for click in &clicks {
            accumulator.add_click(click);
        }
        for event in &activity {
            accumulator.add_activity(event);
        }

        let profile = accumulator.finish(Utc::now());
        self.store
            .put(user_id, &profile)
            .map_err(|source| EngineError::compute(user_id, source))?;
        log::debug!(
            "computed taste profile for {user_id}: {} data points, {} feed failures",
            profile.data_points,
            diagnostics.len()
        );
        Ok((profile, diagnostics))
    }

    /// Overwrite the stored profile for `user_id` with an empty one and
    /// return it.
    ///
    /// The next [`Self::get`] recomputes from scratch, because an empty
    /// document never satisfies the freshness check.
    ///
    /// # Errors
    /// Returns [`EngineError::Reset`] when persisting the empty document
    /// fails.
    pub fn reset(&self, user_id: &str) -> Result<TasteProfile, EngineError> {
        let profile = TasteProfile::empty(user_id, Utc::now());
        self.store
            .put(user_id, &profile)
            .map_err(|source| EngineError::reset(user_id, source))?;
        log::info!("reset taste profile for {user_id}");
        Ok(profile)
    }
}

fn degrade<T>(result: Result<Vec<T>, SourceError>, diagnostics: &mut Vec<SourceError>) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(error) => {
            log::warn!("{error}, treating feed as empty");
            diagnostics.push(error);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        clippy::indexing_slicing,
        reason = "tests should fail fast when setup breaks"
    )]

    use super::*;
    use chrono::{TimeDelta, Utc};
    use palate_core::record::{ClickKind, ClickRecord, FoodLogRecord};
    use palate_core::test_support::{MemoryProfileStore, MemorySources};
    use palate_core::{FeedKind, ProfileStore};
    use rstest::rstest;
    use std::sync::Arc;

    fn food_log(cuisine: &str) -> FoodLogRecord {
        FoodLogRecord {
            cuisine: cuisine.into(),
            food_type: "noodles".into(),
            eaten_at: Utc::now(),
            rating: None,
        }
    }

    fn view_click(restaurant_id: &str) -> ClickRecord {
        ClickRecord {
            restaurant_id: restaurant_id.into(),
            cuisine_types: vec!["Italian".into()],
            kind: ClickKind::View,
        }
    }

    #[rstest]
    fn compute_folds_feeds_and_persists() {
        let sources = MemorySources::new()
            .with_food_logs(vec![food_log("Thai")])
            .with_clicks(vec![view_click("R1")]);
        let store = Arc::new(MemoryProfileStore::new());
        let engine = TasteProfileEngine::new(sources, Arc::clone(&store));

        let profile = engine.compute("u1").expect("compute");
        assert_eq!(profile.data_points, 2);
        assert!(profile.cuisine_scores.contains_key("Thai"));
        assert!(profile.restaurant_scores.contains_key("R1"));

        let stored = store.get("u1").expect("read back").expect("persisted");
        assert_eq!(stored, profile);
    }

    #[rstest]
    fn failed_feed_degrades_to_empty_with_a_diagnostic() {
        let sources = MemorySources::new()
            .with_food_logs(vec![food_log("Thai")])
            .with_failing_feed(FeedKind::Clicks);
        let engine = TasteProfileEngine::new(sources, MemoryProfileStore::new());

        let (profile, diagnostics) = engine
            .compute_with_diagnostics("u1")
            .expect("compute succeeds despite the failed feed");
        assert_eq!(profile.data_points, 1);
        assert!(profile.restaurant_scores.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].feed, FeedKind::Clicks);
    }

    #[rstest]
    fn all_feeds_failing_still_persists_an_empty_profile() {
        let sources = MemorySources::new()
            .with_failing_feed(FeedKind::FoodLogs)
            .with_failing_feed(FeedKind::SavedRestaurants)
            .with_failing_feed(FeedKind::LikedPosts)
            .with_failing_feed(FeedKind::Clicks)
            .with_failing_feed(FeedKind::Activity);
        let store = Arc::new(MemoryProfileStore::new());
        let engine = TasteProfileEngine::new(sources, Arc::clone(&store));

        let (profile, diagnostics) = engine.compute_with_diagnostics("u1").expect("compute");
        assert_eq!(profile.data_points, 0);
        assert_eq!(diagnostics.len(), 5);
        assert_eq!(store.writes(), 1);
    }

    #[rstest]
    fn store_write_failure_fails_the_compute() {
        let store = MemoryProfileStore::new();
        store.set_fail_writes(true);
        let engine = TasteProfileEngine::new(MemorySources::new(), store);

        let error = engine.compute("u1").expect_err("write failure surfaces");
        assert!(matches!(error, EngineError::Compute { .. }));
    }

    #[rstest]
    fn store_read_failure_fails_the_get() {
        let store = MemoryProfileStore::new();
        store.set_fail_reads(true);
        let engine = TasteProfileEngine::new(MemorySources::new(), store);

        let error = engine.get("u1", false).expect_err("read failure surfaces");
        assert!(matches!(error, EngineError::Compute { .. }));
    }

    #[rstest]
    fn fresh_complete_profile_is_served_without_recompute() {
        let sources = MemorySources::new().with_food_logs(vec![food_log("Thai"); 25]);
        let store = Arc::new(MemoryProfileStore::new());
        let engine = TasteProfileEngine::new(sources, Arc::clone(&store));

        let first = engine.get("u1", false).expect("initial compute");
        assert!(first.is_complete());
        assert_eq!(store.writes(), 1);

        let second = engine.get("u1", false).expect("cached get");
        assert_eq!(store.writes(), 1);
        assert_eq!(second, first);
    }

    #[rstest]
    fn stale_profile_triggers_recompute() {
        let sources = MemorySources::new().with_food_logs(vec![food_log("Thai"); 25]);
        let store = Arc::new(MemoryProfileStore::new());
        let engine = TasteProfileEngine::new(sources, Arc::clone(&store));

        let mut profile = engine.get("u1", false).expect("initial compute");
        profile.last_computed = Utc::now() - TimeDelta::hours(7);
        store.seed(profile);

        engine.get("u1", false).expect("stale get");
        assert_eq!(store.writes(), 2);
    }

    #[rstest]
    fn force_recomputes_a_fresh_profile() {
        let sources = MemorySources::new().with_food_logs(vec![food_log("Thai"); 25]);
        let store = Arc::new(MemoryProfileStore::new());
        let engine = TasteProfileEngine::new(sources, Arc::clone(&store));

        engine.get("u1", false).expect("initial compute");
        engine.get("u1", true).expect("forced get");
        assert_eq!(store.writes(), 2);
    }

    #[rstest]
    fn mismatched_stored_user_id_heals_by_recompute() {
        let sources = MemorySources::new().with_food_logs(vec![food_log("Thai"); 25]);
        let store = Arc::new(MemoryProfileStore::new());
        let engine = TasteProfileEngine::new(sources, Arc::clone(&store));

        let wrong = TasteProfile::empty("someone-else", Utc::now());
        store.put("u1", &wrong).expect("seed the mismatched document");

        let served = engine.get("u1", false).expect("recomputes without error");
        assert_eq!(served.user_id, "u1");
        let healed = store.get("u1").expect("read").expect("present");
        assert_eq!(healed.user_id, "u1");
    }

    #[rstest]
    fn reset_zeroes_the_stored_document() {
        let sources = MemorySources::new().with_food_logs(vec![food_log("Thai")]);
        let store = Arc::new(MemoryProfileStore::new());
        let engine = TasteProfileEngine::new(sources, Arc::clone(&store));

        engine.compute("u1").expect("compute");
        let cleared = engine.reset("u1").expect("reset");

        let stored = store.get("u1").expect("read").expect("present");
        assert_eq!(stored, cleared);
        assert_eq!(stored.data_points, 0);
        assert_eq!(stored.confidence_score, 0.0);
        assert!(stored.cuisine_scores.is_empty());
    }

    #[rstest]
    fn get_after_reset_serves_an_empty_profile() {
        let store = Arc::new(MemoryProfileStore::new());
        let engine = TasteProfileEngine::new(MemorySources::new(), Arc::clone(&store));

        engine.reset("u1").expect("reset");
        let served = engine.get("u1", false).expect("get after reset");

        assert_eq!(served.data_points, 0);
        assert_eq!(served.confidence_score, 0.0);
        assert!(served.cuisine_scores.is_empty());
        assert!(served.food_type_scores.is_empty());
        assert!(served.restaurant_scores.is_empty());
    }

    #[rstest]
    fn reset_write_failure_maps_to_reset_error() {
        let store = MemoryProfileStore::new();
        store.set_fail_writes(true);
        let engine = TasteProfileEngine::new(MemorySources::new(), store);

        let error = engine.reset("u1").expect_err("write failure surfaces");
        assert!(matches!(error, EngineError::Reset { .. }));
    }

    #[rstest]
    fn activity_fetch_is_capped() {
        let events = vec![
            palate_core::record::ActivityRecord::SearchNoClick {
                query: "ramen".into(),
            };
            ACTIVITY_FETCH_LIMIT + 50
        ];
        let sources = MemorySources::new().with_activity(events);
        let engine = TasteProfileEngine::new(sources, MemoryProfileStore::new());

        let profile = engine.compute("u1").expect("compute");
        let tallies = profile.negative_signals.repeated_search_no_click["ramen"];
        assert_eq!(usize::try_from(tallies).expect("fits"), ACTIVITY_FETCH_LIMIT);
    }
}
