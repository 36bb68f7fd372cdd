//! Profile persistence seam and change notification.
//!
//! The `ProfileStore` trait is the engine's only persistence dependency:
//! whole-document reads and overwrites keyed by user id. Concurrent
//! writers are not coordinated; the last write wins, with no merge. The
//! `watch` submodule provides the instance-scoped subscriber registry
//! stores use to announce writes.

use thiserror::Error;

use crate::profile::TasteProfile;

mod watch;

#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use watch::{WatchHandle, Watchers};

#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteProfileStore, SqliteProfileStoreError};

/// Failure reading or writing a stored profile.
///
/// Persistence failures are fatal to the operation that hit them: the
/// engine never serves a partial document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the stored document failed.
    #[error("failed to read stored profile for {user_id}")]
    Read {
        /// User whose document was requested.
        user_id: String,
        /// Backend failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Writing the document failed.
    #[error("failed to write profile for {user_id}")]
    Write {
        /// User whose document was being written.
        user_id: String,
        /// Backend failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Build a read failure for `user_id`.
    #[must_use]
    pub fn read(
        user_id: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Read {
            user_id: user_id.into(),
            source: Box::new(source),
        }
    }

    /// Build a write failure for `user_id`.
    #[must_use]
    pub fn write(
        user_id: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Write {
            user_id: user_id.into(),
            source: Box::new(source),
        }
    }
}

/// Whole-document profile persistence keyed by user id.
///
/// `put` overwrites unconditionally: each computation pass produces a
/// complete document and replaces whatever was stored. Implementations
/// must be `Send + Sync` so one engine can be shared across threads.
pub trait ProfileStore: Send + Sync {
    /// Return the stored profile for `user_id`, if one exists.
    fn get(&self, user_id: &str) -> Result<Option<TasteProfile>, StoreError>;

    /// Replace the stored profile for `user_id` with `profile`.
    fn put(&self, user_id: &str, profile: &TasteProfile) -> Result<(), StoreError>;
}

impl<T: ProfileStore + ?Sized> ProfileStore for std::sync::Arc<T> {
    fn get(&self, user_id: &str) -> Result<Option<TasteProfile>, StoreError> {
        (**self).get(user_id)
    }

    fn put(&self, user_id: &str, profile: &TasteProfile) -> Result<(), StoreError> {
        (**self).put(user_id, profile)
    }
}
