//! Collaborator seam for the five raw activity feeds.
//!
//! Each fetch returns its own `Result` so the engine can degrade a single
//! failing feed to an empty list while keeping the failure observable as
//! a [`SourceError`] diagnostic, rather than aborting the whole pass.

use thiserror::Error;

use crate::record::{
    ActivityRecord, ClickRecord, FoodLogRecord, LikedPostRecord, SavedRestaurantRecord,
};

/// Identifies one of the five contributing feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// Food-log entries.
    FoodLogs,
    /// Saved restaurants.
    SavedRestaurants,
    /// Liked community posts.
    LikedPosts,
    /// Behavioural activity events.
    Activity,
    /// Restaurant clicks.
    Clicks,
}

impl FeedKind {
    /// Return the feed name as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FoodLogs => "food_logs",
            Self::SavedRestaurants => "saved_restaurants",
            Self::LikedPosts => "liked_posts",
            Self::Activity => "activity",
            Self::Clicks => "clicks",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure fetching one feed.
///
/// Recoverable by design: the engine substitutes an empty list and keeps
/// the error in its diagnostics. Only persistence failures are fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to fetch {feed} feed: {message}")]
pub struct SourceError {
    /// Which feed failed.
    pub feed: FeedKind,
    /// Collaborator-supplied description of the failure.
    pub message: String,
}

impl SourceError {
    /// Build an error for `feed` with a collaborator-supplied message.
    #[must_use]
    pub fn new(feed: FeedKind, message: impl Into<String>) -> Self {
        Self {
            feed,
            message: message.into(),
        }
    }
}

/// The five raw activity feeds backing profile computation.
///
/// Implementations wrap whatever upstream storage holds the data; each
/// method fetches everything recorded for `user_id` (bounded for
/// activity). Implementations must be `Send + Sync` so one engine can be
/// shared across threads.
///
/// # Examples
/// ```
/// use palate_core::{FoodLogRecord, SignalSources, SourceError};
/// use palate_core::record::{
///     ActivityRecord, ClickRecord, LikedPostRecord, SavedRestaurantRecord,
/// };
///
/// struct EmptySources;
///
/// impl SignalSources for EmptySources {
///     fn food_logs(&self, _: &str) -> Result<Vec<FoodLogRecord>, SourceError> {
///         Ok(Vec::new())
///     }
///     fn saved_restaurants(&self, _: &str) -> Result<Vec<SavedRestaurantRecord>, SourceError> {
///         Ok(Vec::new())
///     }
///     fn liked_posts(&self, _: &str) -> Result<Vec<LikedPostRecord>, SourceError> {
///         Ok(Vec::new())
///     }
///     fn recent_activity(&self, _: &str, _: usize) -> Result<Vec<ActivityRecord>, SourceError> {
///         Ok(Vec::new())
///     }
///     fn restaurant_clicks(&self, _: &str) -> Result<Vec<ClickRecord>, SourceError> {
///         Ok(Vec::new())
///     }
/// }
///
/// let sources = EmptySources;
/// assert!(sources.food_logs("user-1").expect("fetch").is_empty());
/// ```
pub trait SignalSources: Send + Sync {
    /// Return every food-log entry for the user.
    fn food_logs(&self, user_id: &str) -> Result<Vec<FoodLogRecord>, SourceError>;

    /// Return the user's saved restaurants.
    fn saved_restaurants(&self, user_id: &str) -> Result<Vec<SavedRestaurantRecord>, SourceError>;

    /// Return the user's liked posts, resolved to their restaurants.
    fn liked_posts(&self, user_id: &str) -> Result<Vec<LikedPostRecord>, SourceError>;

    /// Return up to `limit` of the user's most recent activity events,
    /// newest first.
    fn recent_activity(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, SourceError>;

    /// Return the user's recorded restaurant clicks.
    fn restaurant_clicks(&self, user_id: &str) -> Result<Vec<ClickRecord>, SourceError>;
}

impl<T: SignalSources + ?Sized> SignalSources for std::sync::Arc<T> {
    fn food_logs(&self, user_id: &str) -> Result<Vec<FoodLogRecord>, SourceError> {
        (**self).food_logs(user_id)
    }

    fn saved_restaurants(&self, user_id: &str) -> Result<Vec<SavedRestaurantRecord>, SourceError> {
        (**self).saved_restaurants(user_id)
    }

    fn liked_posts(&self, user_id: &str) -> Result<Vec<LikedPostRecord>, SourceError> {
        (**self).liked_posts(user_id)
    }

    fn recent_activity(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, SourceError> {
        (**self).recent_activity(user_id, limit)
    }

    fn restaurant_clicks(&self, user_id: &str) -> Result<Vec<ClickRecord>, SourceError> {
        (**self).restaurant_clicks(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_names_the_feed() {
        let err = SourceError::new(FeedKind::LikedPosts, "upstream timeout");
        assert_eq!(
            err.to_string(),
            "failed to fetch liked_posts feed: upstream timeout"
        );
    }

    #[test]
    fn feed_kind_display_matches_as_str() {
        assert_eq!(FeedKind::Activity.to_string(), FeedKind::Activity.as_str());
    }
}
