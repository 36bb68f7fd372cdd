//! The persisted taste-profile document and its component types.
//!
//! A [`TasteProfile`] is computed per user and fully replaced on every
//! recomputation; it is never patched incrementally. All `score` fields
//! are normalised into `0.0..=100.0` against the maximum score observed
//! in the same map during the pass that produced them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

/// Confidence saturates once this many raw records back a profile.
pub const CONFIDENCE_SATURATION: u32 = 20;

/// Affinity entry for a named cuisine.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CuisineScore {
    /// Normalised affinity in `0.0..=100.0`.
    pub score: f32,
    /// Number of positive contributions folded into this entry.
    pub frequency: u32,
    /// Most recent food-log date for this cuisine, when known.
    pub last_eaten: Option<DateTime<Utc>>,
    /// Running mean of food-log ratings, when any log carried one.
    pub avg_rating: Option<f32>,
}

/// Affinity entry for a food type (e.g. "noodles", "dessert").
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoodTypeScore {
    /// Normalised affinity in `0.0..=100.0`.
    pub score: f32,
    /// Number of positive contributions folded into this entry.
    pub frequency: u32,
}

/// Affinity entry for a single restaurant.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestaurantScore {
    /// Normalised affinity in `0.0..=100.0`.
    pub score: f32,
    /// Number of click interactions recorded for the restaurant.
    pub visit_count: u32,
    /// Running mean of time spent viewing the restaurant, in milliseconds.
    pub avg_time_spent_ms: f64,
    /// Whether the user has saved the restaurant.
    pub saved: bool,
}

/// Cuisines observed per hour of day and per day of week.
///
/// Hours are `0..=23`; days are `0..=6` with `0 = Sunday`, matching the
/// upstream activity data.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimePatterns {
    /// Cuisines eaten at each hour of the day.
    pub hour_of_day: BTreeMap<u8, BTreeSet<String>>,
    /// Cuisines eaten on each day of the week.
    pub day_of_week: BTreeMap<u8, BTreeSet<String>>,
}

/// Price-band preference.
///
/// Not derived from data in this version: every computed profile carries
/// the same default. Kept in the document so downstream consumers have a
/// stable shape when derivation lands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BudgetPreference {
    /// Mean price rating across logged visits.
    pub avg_price_rating: f32,
    /// Inclusive `(min, max)` price-rating band.
    pub range: (u8, u8),
}

impl Default for BudgetPreference {
    fn default() -> Self {
        Self {
            avg_price_rating: 2.0,
            range: (1, 3),
        }
    }
}

/// Geographic preference.
///
/// A fixed default, like [`BudgetPreference`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationPreference {
    /// Maximum distance the user will travel, in kilometres.
    pub max_distance_km: f32,
    /// Named areas the user favours.
    pub preferred_areas: Vec<String>,
}

impl Default for LocationPreference {
    fn default() -> Self {
        Self {
            max_distance_km: 10.0,
            preferred_areas: Vec::new(),
        }
    }
}

/// Negative interaction tallies.
///
/// These never create score-map entries; they only record occurrences
/// (and, for quick exits, decay scores that already exist).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NegativeSignals {
    /// Quick-exit count per restaurant identifier.
    pub quick_exits: BTreeMap<String, u32>,
    /// Count of searches that produced no click, per query string.
    pub repeated_search_no_click: BTreeMap<String, u32>,
}

/// A user's computed taste profile.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use palate_core::TasteProfile;
///
/// let profile = TasteProfile::empty("user-1", Utc::now());
/// assert_eq!(profile.data_points, 0);
/// assert_eq!(profile.confidence_score, 0.0);
/// assert!(profile.cuisine_scores.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TasteProfile {
    /// Owning user identifier.
    pub user_id: String,
    /// Affinity per cuisine name.
    pub cuisine_scores: BTreeMap<String, CuisineScore>,
    /// Affinity per food-type name.
    pub food_type_scores: BTreeMap<String, FoodTypeScore>,
    /// Affinity per restaurant identifier.
    pub restaurant_scores: BTreeMap<String, RestaurantScore>,
    /// When the user eats which cuisines.
    pub time_patterns: TimePatterns,
    /// Price-band preference (fixed default in this version).
    pub budget_preference: BudgetPreference,
    /// Geographic preference (fixed default in this version).
    pub location_preference: LocationPreference,
    /// Negative interaction tallies.
    pub negative_signals: NegativeSignals,
    /// Timestamp of the pass that produced this document.
    pub last_computed: DateTime<Utc>,
    /// Count of contributing source records.
    pub data_points: u32,
    /// Derived confidence in `0.0..=100.0`; saturates at
    /// [`CONFIDENCE_SATURATION`] records.
    pub confidence_score: f32,
}

impl TasteProfile {
    /// Build the all-default document used by reset and first computation.
    #[must_use]
    pub fn empty(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            cuisine_scores: BTreeMap::new(),
            food_type_scores: BTreeMap::new(),
            restaurant_scores: BTreeMap::new(),
            time_patterns: TimePatterns::default(),
            budget_preference: BudgetPreference::default(),
            location_preference: LocationPreference::default(),
            negative_signals: NegativeSignals::default(),
            last_computed: now,
            data_points: 0,
            confidence_score: 0.0,
        }
    }

    /// Report whether the profile has accumulated enough records for its
    /// confidence to saturate.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.confidence_score >= 100.0
    }

    /// Derive the confidence score for a record count.
    ///
    /// `min(100, data_points / 20 × 100)`: each record is worth five
    /// points until saturation.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "the product saturates at 100 long before f32 loses integer precision"
    )]
    pub fn confidence_for(data_points: u32) -> f32 {
        let scaled = data_points.saturating_mul(5).min(100);
        scaled as f32
    }
}
