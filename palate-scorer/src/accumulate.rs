//! Folding raw records into a finished taste profile.
//!
//! The accumulator is fed one source at a time, positives first:
//! food logs, saved restaurants, liked posts, clicks, then activity.
//! Negative signals only act on entries that already exist, and dwell
//! times attach to restaurants the click feed created, so activity must
//! fold last; the positive sources themselves are additive and
//! commutative. [`ProfileAccumulator::finish`] then runs the terminal
//! passes: recency decay, per-map normalisation, and confidence.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use palate_core::profile::{
    BudgetPreference, CuisineScore, FoodTypeScore, LocationPreference, NegativeSignals,
    RestaurantScore, TasteProfile, TimePatterns,
};
use palate_core::record::{
    ActivityRecord, ClickKind, ClickRecord, FoodLogRecord, LikedPostRecord, SavedRestaurantRecord,
};

use crate::weights::{DECAY_FLOOR, DECAY_HORIZON_DAYS, NORMALISED_MAX, SignalWeights};

/// Folds source records into raw score state, then finishes them into a
/// complete [`TasteProfile`].
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use palate_core::record::FoodLogRecord;
/// use palate_scorer::{ProfileAccumulator, SignalWeights};
///
/// let now = Utc::now();
/// let mut accumulator = ProfileAccumulator::new("user-1", SignalWeights::default());
/// accumulator.add_food_log(&FoodLogRecord {
///     cuisine: "Thai".into(),
///     food_type: "noodles".into(),
///     eaten_at: now,
///     rating: None,
/// });
/// let profile = accumulator.finish(now);
///
/// assert_eq!(profile.data_points, 1);
/// assert_eq!(profile.confidence_score, 5.0);
/// let thai = &profile.cuisine_scores["Thai"];
/// assert_eq!(thai.score, 100.0);
/// assert_eq!(thai.frequency, 1);
/// ```
#[derive(Debug)]
pub struct ProfileAccumulator {
    user_id: String,
    weights: SignalWeights,
    cuisines: BTreeMap<String, CuisineScore>,
    food_types: BTreeMap<String, FoodTypeScore>,
    restaurants: BTreeMap<String, RestaurantScore>,
    time_patterns: TimePatterns,
    negative: NegativeSignals,
    rating_counts: BTreeMap<String, u32>,
    data_points: u32,
}

impl ProfileAccumulator {
    /// Start an empty accumulation pass for `user_id`.
    #[must_use]
    pub fn new(user_id: impl Into<String>, weights: SignalWeights) -> Self {
        Self {
            user_id: user_id.into(),
            weights,
            cuisines: BTreeMap::new(),
            food_types: BTreeMap::new(),
            restaurants: BTreeMap::new(),
            time_patterns: TimePatterns::default(),
            negative: NegativeSignals::default(),
            rating_counts: BTreeMap::new(),
            data_points: 0,
        }
    }

    /// Fold one food-log entry: cuisine and food type each gain the
    /// food-log weight, the cuisine's last-eaten date and rating mean
    /// advance, and the hour/day time patterns record the cuisine.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "score contributions and the rating running mean are floating point"
    )]
    pub fn add_food_log(&mut self, log: &FoodLogRecord) {
        let entry = self.cuisines.entry(log.cuisine.clone()).or_default();
        entry.score += self.weights.food_log;
        entry.frequency += 1;
        if entry.last_eaten.is_none_or(|seen| log.eaten_at > seen) {
            entry.last_eaten = Some(log.eaten_at);
        }
        if let Some(rating) = log.rating {
            let count = self.rating_counts.entry(log.cuisine.clone()).or_insert(0);
            let rated = *count as f32;
            let prev = entry.avg_rating.unwrap_or(0.0);
            entry.avg_rating = Some((prev * rated + rating) / (rated + 1.0));
            *count += 1;
        }

        let hour = u8::try_from(log.eaten_at.hour()).unwrap_or(0);
        let day = u8::try_from(log.eaten_at.weekday().num_days_from_sunday()).unwrap_or(0);
        self.time_patterns
            .hour_of_day
            .entry(hour)
            .or_default()
            .insert(log.cuisine.clone());
        self.time_patterns
            .day_of_week
            .entry(day)
            .or_default()
            .insert(log.cuisine.clone());

        let food_type = self.food_types.entry(log.food_type.clone()).or_default();
        food_type.score += self.weights.food_log;
        food_type.frequency += 1;

        self.data_points += 1;
    }

    /// Fold one saved restaurant: the restaurant is marked saved and it
    /// and each of its cuisines gain the saved-restaurant weight.
    #[expect(
        clippy::float_arithmetic,
        reason = "score contributions are floating point"
    )]
    pub fn add_saved_restaurant(&mut self, saved: &SavedRestaurantRecord) {
        let entry = self
            .restaurants
            .entry(saved.restaurant_id.clone())
            .or_default();
        entry.score += self.weights.saved_restaurant;
        entry.saved = true;
        for cuisine in &saved.cuisine_types {
            let cuisine_entry = self.cuisines.entry(cuisine.clone()).or_default();
            cuisine_entry.score += self.weights.saved_restaurant;
            cuisine_entry.frequency += 1;
        }
        self.data_points += 1;
    }

    /// Fold one liked post: its restaurant gains the liked-post weight.
    #[expect(
        clippy::float_arithmetic,
        reason = "score contributions are floating point"
    )]
    pub fn add_liked_post(&mut self, post: &LikedPostRecord) {
        let entry = self
            .restaurants
            .entry(post.restaurant_id.clone())
            .or_default();
        entry.score += self.weights.liked_post;
        self.data_points += 1;
    }

    /// Fold one click: the restaurant gains the view or explore weight
    /// and a visit, and each cuisine gains the matching cuisine weight.
    #[expect(
        clippy::float_arithmetic,
        reason = "score contributions are floating point"
    )]
    pub fn add_click(&mut self, click: &ClickRecord) {
        let (restaurant_weight, cuisine_weight) = match click.kind {
            ClickKind::View => (self.weights.view_restaurant, self.weights.view_cuisine),
            ClickKind::Explore => (self.weights.explore_restaurant, self.weights.explore_cuisine),
        };
        let entry = self
            .restaurants
            .entry(click.restaurant_id.clone())
            .or_default();
        entry.score += restaurant_weight;
        entry.visit_count += 1;
        for cuisine in &click.cuisine_types {
            let cuisine_entry = self.cuisines.entry(cuisine.clone()).or_default();
            cuisine_entry.score += cuisine_weight;
            cuisine_entry.frequency += 1;
        }
        self.data_points += 1;
    }

    /// Fold one activity event. Activity adjusts existing entries and
    /// negative tallies but never counts towards `data_points`, and a
    /// negative signal never creates a score entry.
    #[expect(
        clippy::float_arithmetic,
        reason = "quick-exit decay and the dwell-time running mean are floating point"
    )]
    pub fn add_activity(&mut self, event: &ActivityRecord) {
        match event {
            ActivityRecord::QuickExit {
                restaurant_id,
                cuisine_types,
            } => {
                *self
                    .negative
                    .quick_exits
                    .entry(restaurant_id.clone())
                    .or_insert(0) += 1;
                if let Some(entry) = self.restaurants.get_mut(restaurant_id) {
                    entry.score *= self.weights.quick_exit_decay;
                }
                for cuisine in cuisine_types {
                    if let Some(entry) = self.cuisines.get_mut(cuisine) {
                        entry.score *= self.weights.quick_exit_decay;
                    }
                }
            }
            ActivityRecord::SearchNoClick { query } => {
                *self
                    .negative
                    .repeated_search_no_click
                    .entry(query.clone())
                    .or_insert(0) += 1;
            }
            ActivityRecord::RestaurantView {
                restaurant_id,
                time_spent_ms,
            } => {
                if let Some(entry) = self.restaurants.get_mut(restaurant_id) {
                    // The divisor counts one more sample than the
                    // multiplier; persisted documents depend on these
                    // exact values.
                    let visits = f64::from(entry.visit_count);
                    entry.avg_time_spent_ms =
                        (entry.avg_time_spent_ms * visits + time_spent_ms) / (visits + 1.0);
                }
            }
        }
    }

    /// Run the terminal passes and produce the finished profile.
    ///
    /// Recency decay applies once, after all positive contributions;
    /// each score map is then normalised independently against its own
    /// maximum, and confidence derives from the record count.
    #[must_use]
    pub fn finish(mut self, now: DateTime<Utc>) -> TasteProfile {
        self.apply_recency_decay(now);
        normalise_scores(&mut self.cuisines, |entry| &mut entry.score);
        normalise_scores(&mut self.food_types, |entry| &mut entry.score);
        normalise_scores(&mut self.restaurants, |entry| &mut entry.score);

        TasteProfile {
            user_id: self.user_id,
            cuisine_scores: self.cuisines,
            food_type_scores: self.food_types,
            restaurant_scores: self.restaurants,
            time_patterns: self.time_patterns,
            budget_preference: BudgetPreference::default(),
            location_preference: LocationPreference::default(),
            negative_signals: self.negative,
            last_computed: now,
            data_points: self.data_points,
            confidence_score: TasteProfile::confidence_for(self.data_points),
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "recency decay multiplies scores by a time factor"
    )]
    fn apply_recency_decay(&mut self, now: DateTime<Utc>) {
        for entry in self.cuisines.values_mut() {
            if let Some(last_eaten) = entry.last_eaten {
                entry.score *= decay_factor(last_eaten, now);
            }
        }
    }
}

/// Linear decay towards [`DECAY_FLOOR`] over [`DECAY_HORIZON_DAYS`].
///
/// Future dates count as zero days old.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "day counts are far below f32 integer precision"
)]
fn decay_factor(last_eaten: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let days = (now - last_eaten).num_days().max(0) as f32;
    (1.0 - days / DECAY_HORIZON_DAYS).max(DECAY_FLOOR)
}

/// Scale every score by `100 / max(map maximum, 1)`, clamped at 100.
///
/// The divisor floor keeps an all-zero map at zero instead of dividing
/// by zero.
#[expect(
    clippy::float_arithmetic,
    reason = "normalisation divides by the map maximum"
)]
fn normalise_scores<T>(map: &mut BTreeMap<String, T>, score_of: impl Fn(&mut T) -> &mut f32) {
    let max = map
        .values_mut()
        .map(|value| *score_of(value))
        .fold(0.0_f32, f32::max);
    let divisor = max.max(1.0);
    for value in map.values_mut() {
        let score = score_of(value);
        *score = (*score / divisor * NORMALISED_MAX).min(NORMALISED_MAX);
    }
}
