//! Per-signal score contributions and the engine's numeric policy knobs.

/// Upper bound of every normalised score.
pub const NORMALISED_MAX: f32 = 100.0;

/// Recency decay never reduces a cuisine score below this share.
pub const DECAY_FLOOR: f32 = 0.5;

/// Days over which a cuisine score decays linearly towards the floor.
pub const DECAY_HORIZON_DAYS: f32 = 90.0;

/// Upper bound on activity events fetched per computation pass.
pub const ACTIVITY_FETCH_LIMIT: usize = 200;

/// Additive score contributions per record, applied before normalisation.
///
/// The defaults encode the product weighting: explicit actions (logging a
/// meal, saving a restaurant) outweigh passive ones (liking a post,
/// clicking a listing), and explore clicks outweigh plain views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalWeights {
    /// Contribution of a food-log entry to its cuisine and food type.
    pub food_log: f32,
    /// Contribution of a saved restaurant to the restaurant and each of
    /// its cuisines.
    pub saved_restaurant: f32,
    /// Contribution of a liked post to its restaurant.
    pub liked_post: f32,
    /// Contribution of a view click to the restaurant.
    pub view_restaurant: f32,
    /// Contribution of a view click to each cuisine.
    pub view_cuisine: f32,
    /// Contribution of an explore click to the restaurant.
    pub explore_restaurant: f32,
    /// Contribution of an explore click to each cuisine.
    pub explore_cuisine: f32,
    /// Multiplier applied by a quick exit to existing scores.
    pub quick_exit_decay: f32,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            food_log: 50.0,
            saved_restaurant: 30.0,
            liked_post: 15.0,
            view_restaurant: 15.0,
            view_cuisine: 10.0,
            explore_restaurant: 35.0,
            explore_cuisine: 20.0,
            quick_exit_decay: 0.8,
        }
    }
}
