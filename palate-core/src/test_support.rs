//! Test-only, in-memory collaborators used by unit and behaviour tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use thiserror::Error;

use crate::profile::TasteProfile;
use crate::record::{
    ActivityRecord, ClickRecord, FoodLogRecord, LikedPostRecord, SavedRestaurantRecord,
};
use crate::source::{FeedKind, SignalSources, SourceError};
use crate::store::{ProfileStore, StoreError, WatchHandle, Watchers};

#[derive(Debug, Error)]
#[error("injected failure")]
struct Injected;

/// In-memory `SignalSources` with per-feed records and failure injection.
///
/// Records are shared across all user ids; tests exercise one user at a
/// time.
#[derive(Default)]
pub struct MemorySources {
    food_logs: Vec<FoodLogRecord>,
    saved_restaurants: Vec<SavedRestaurantRecord>,
    liked_posts: Vec<LikedPostRecord>,
    activity: Vec<ActivityRecord>,
    clicks: Vec<ClickRecord>,
    failing: BTreeSet<&'static str>,
}

impl MemorySources {
    /// Create sources with every feed empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the food-log feed.
    #[must_use]
    pub fn with_food_logs(mut self, records: Vec<FoodLogRecord>) -> Self {
        self.food_logs = records;
        self
    }

    /// Seed the saved-restaurants feed.
    #[must_use]
    pub fn with_saved_restaurants(mut self, records: Vec<SavedRestaurantRecord>) -> Self {
        self.saved_restaurants = records;
        self
    }

    /// Seed the liked-posts feed.
    #[must_use]
    pub fn with_liked_posts(mut self, records: Vec<LikedPostRecord>) -> Self {
        self.liked_posts = records;
        self
    }

    /// Seed the activity feed, newest first.
    #[must_use]
    pub fn with_activity(mut self, records: Vec<ActivityRecord>) -> Self {
        self.activity = records;
        self
    }

    /// Seed the clicks feed.
    #[must_use]
    pub fn with_clicks(mut self, records: Vec<ClickRecord>) -> Self {
        self.clicks = records;
        self
    }

    /// Make one feed fail with an injected error.
    #[must_use]
    pub fn with_failing_feed(mut self, feed: FeedKind) -> Self {
        self.failing.insert(feed.as_str());
        self
    }

    fn check(&self, feed: FeedKind) -> Result<(), SourceError> {
        if self.failing.contains(feed.as_str()) {
            return Err(SourceError::new(feed, "injected failure"));
        }
        Ok(())
    }
}

impl SignalSources for MemorySources {
    fn food_logs(&self, _user_id: &str) -> Result<Vec<FoodLogRecord>, SourceError> {
        self.check(FeedKind::FoodLogs)?;
        Ok(self.food_logs.clone())
    }

    fn saved_restaurants(&self, _user_id: &str) -> Result<Vec<SavedRestaurantRecord>, SourceError> {
        self.check(FeedKind::SavedRestaurants)?;
        Ok(self.saved_restaurants.clone())
    }

    fn liked_posts(&self, _user_id: &str) -> Result<Vec<LikedPostRecord>, SourceError> {
        self.check(FeedKind::LikedPosts)?;
        Ok(self.liked_posts.clone())
    }

    fn recent_activity(
        &self,
        _user_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, SourceError> {
        self.check(FeedKind::Activity)?;
        Ok(self.activity.iter().take(limit).cloned().collect())
    }

    fn restaurant_clicks(&self, _user_id: &str) -> Result<Vec<ClickRecord>, SourceError> {
        self.check(FeedKind::Clicks)?;
        Ok(self.clicks.clone())
    }
}

/// In-memory `ProfileStore` with failure injection and write counting.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, TasteProfile>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    watchers: Watchers<TasteProfile>,
}

impl MemoryProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `profile` under its own user id.
    #[must_use]
    pub fn with_profile(profile: TasteProfile) -> Self {
        let store = Self::new();
        store.seed(profile);
        store
    }

    /// Insert a profile directly, bypassing failure injection and counters.
    pub fn seed(&self, profile: TasteProfile) {
        let mut profiles = self
            .profiles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        profiles.insert(profile.user_id.clone(), profile);
    }

    /// Make subsequent reads fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes since construction.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Subscribe to successful writes.
    pub fn subscribe(
        &self,
        callback: impl Fn(&TasteProfile) + Send + Sync + 'static,
    ) -> WatchHandle<TasteProfile> {
        self.watchers.subscribe(callback)
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<TasteProfile>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::read(user_id, Injected));
        }
        let profiles = self
            .profiles
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(profiles.get(user_id).cloned())
    }

    fn put(&self, user_id: &str, profile: &TasteProfile) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::write(user_id, Injected));
        }
        {
            let mut profiles = self
                .profiles
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            profiles.insert(user_id.to_owned(), profile.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.watchers.notify(profile);
        Ok(())
    }
}
