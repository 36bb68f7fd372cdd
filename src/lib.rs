//! Facade crate for the Palate taste-profile engine.
//!
//! This crate re-exports the core domain types and the scoring engine,
//! and exposes the optional SQLite store behind a feature flag.

#![forbid(unsafe_code)]

pub use palate_core::{
    ActivityRecord, BudgetPreference, ClickKind, ClickRecord, CuisineScore, FRESHNESS_WINDOW_HOURS,
    FeedKind, FoodLogRecord, FoodTypeScore, LikedPostRecord, LocationPreference, NegativeSignals,
    ProfileStore, RecomputeReason, RefreshDecision, RestaurantScore, SavedRestaurantRecord,
    SignalSources, SourceError, StoreError, TasteProfile, TimePatterns, WatchHandle, Watchers,
    decide_refresh,
};
pub use palate_scorer::{
    ACTIVITY_FETCH_LIMIT, EngineError, ProfileAccumulator, SignalWeights, TasteProfileEngine,
};

#[cfg(feature = "store-sqlite")]
pub use palate_core::{SqliteProfileStore, SqliteProfileStoreError};

#[cfg(feature = "test-support")]
pub use palate_core::test_support;
