//! Raw activity records consumed by profile computation.
//!
//! Each record type mirrors one of the five upstream feeds. Activity is a
//! tagged enum so each variant carries exactly the data it needs.

use chrono::{DateTime, Utc};

/// One food-log entry: the user ate `cuisine`/`food_type` at `eaten_at`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoodLogRecord {
    /// Cuisine name, e.g. `"Thai"`.
    pub cuisine: String,
    /// Food-type name, e.g. `"noodles"`.
    pub food_type: String,
    /// When the meal was eaten.
    pub eaten_at: DateTime<Utc>,
    /// Optional star rating the user gave the meal.
    pub rating: Option<f32>,
}

/// A restaurant the user has saved.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedRestaurantRecord {
    /// Restaurant identifier.
    pub restaurant_id: String,
    /// Cuisine types the restaurant serves.
    pub cuisine_types: Vec<String>,
}

/// A community post the user liked, resolved to its restaurant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LikedPostRecord {
    /// Restaurant the post is about.
    pub restaurant_id: String,
}

/// Intent level of a restaurant click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClickKind {
    /// The user opened the restaurant page.
    View,
    /// A higher-intent interaction, e.g. opening directions.
    Explore,
}

impl ClickKind {
    /// Return the kind as a lowercase `&str`.
    ///
    /// # Examples
    /// ```
    /// use palate_core::ClickKind;
    ///
    /// assert_eq!(ClickKind::Explore.as_str(), "explore");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Explore => "explore",
        }
    }
}

impl std::fmt::Display for ClickKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A click on a restaurant listing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClickRecord {
    /// Restaurant identifier.
    pub restaurant_id: String,
    /// Cuisine types the restaurant serves.
    pub cuisine_types: Vec<String>,
    /// Intent level of the click.
    pub kind: ClickKind,
}

/// One behavioural activity event.
///
/// Activity events adjust existing scores or negative tallies; they never
/// count towards a profile's `data_points`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivityRecord {
    /// The user left a restaurant page almost immediately.
    QuickExit {
        /// Restaurant that was abandoned.
        restaurant_id: String,
        /// Cuisine types of that restaurant.
        cuisine_types: Vec<String>,
    },
    /// A search that produced no click on any result.
    SearchNoClick {
        /// The query string as typed.
        query: String,
    },
    /// A restaurant view with a measured dwell time.
    RestaurantView {
        /// Restaurant that was viewed.
        restaurant_id: String,
        /// Dwell time in milliseconds.
        time_spent_ms: f64,
    },
}
