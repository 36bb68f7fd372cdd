//! Taste-profile computation for the Palate engine.
//!
//! The crate turns five raw activity feeds (food logs, saved
//! restaurants, liked posts, behavioural activity, and restaurant
//! clicks) into a normalised [`TasteProfile`](palate_core::TasteProfile):
//!
//! - [`SignalWeights`] carries the per-signal score contributions.
//! - [`ProfileAccumulator`] folds records in a fixed order (positive
//!   sources first, activity last) and runs the terminal passes: recency
//!   decay, per-map normalisation to `0..=100`, and the confidence
//!   derivation.
//! - [`TasteProfileEngine`] wires the accumulator to the collaborator
//!   seams: it fetches each feed independently (a failing feed degrades
//!   to an empty list and is kept as a diagnostic), persists the finished
//!   document wholesale, and applies the cache-refresh policy on reads.
//!
//! # Examples
//!
//! ```
//! use palate_core::test_support::{MemoryProfileStore, MemorySources};
//! use palate_scorer::TasteProfileEngine;
//!
//! let engine = TasteProfileEngine::new(MemorySources::new(), MemoryProfileStore::new());
//! let profile = engine.get("user-1", false).expect("compute profile");
//! assert_eq!(profile.data_points, 0);
//! ```

#![forbid(unsafe_code)]

mod accumulate;
mod engine;
mod error;
mod weights;

pub use accumulate::ProfileAccumulator;
pub use engine::TasteProfileEngine;
pub use error::EngineError;
pub use weights::{
    ACTIVITY_FETCH_LIMIT, DECAY_FLOOR, DECAY_HORIZON_DAYS, NORMALISED_MAX, SignalWeights,
};
