//! Core domain types for the Palate taste-profile engine.
//!
//! The crate defines the persisted [`TasteProfile`] document, the raw
//! activity records it is computed from, the collaborator seams
//! ([`SignalSources`] and [`ProfileStore`]) supplied by integrators, and
//! the pure cache-refresh decision ([`refresh::decide_refresh`]).
//!
//! Scoring itself lives in the `palate-scorer` crate; this crate stays
//! free of weighting policy so stores and feeds can be implemented
//! without pulling in the engine.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod profile;
pub mod record;
pub mod refresh;
pub mod source;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use profile::{
    BudgetPreference, CuisineScore, FoodTypeScore, LocationPreference, NegativeSignals,
    RestaurantScore, TasteProfile, TimePatterns,
};
pub use record::{
    ActivityRecord, ClickKind, ClickRecord, FoodLogRecord, LikedPostRecord, SavedRestaurantRecord,
};
pub use refresh::{FRESHNESS_WINDOW_HOURS, RecomputeReason, RefreshDecision, decide_refresh};
pub use source::{FeedKind, SignalSources, SourceError};
pub use store::{ProfileStore, StoreError, WatchHandle, Watchers};

#[cfg(feature = "store-sqlite")]
pub use store::{SqliteProfileStore, SqliteProfileStoreError};
