//! SQLite-backed profile store.
//!
//! One row per user: the profile is stored as a JSON document in a text
//! column and replaced wholesale on every write, matching the engine's
//! overwrite semantics.

use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

use super::watch::{WatchHandle, Watchers};
use super::{ProfileStore, StoreError};
use crate::profile::TasteProfile;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS profiles (
        user_id TEXT PRIMARY KEY,
        document TEXT NOT NULL
    )";

/// Errors raised while opening the profile database.
#[derive(Debug, Error)]
pub enum SqliteProfileStoreError {
    /// Opening the `SQLite` database failed.
    #[error("failed to open SQLite database at {path}")]
    OpenDatabase {
        /// Requested database path.
        path: Utf8PathBuf,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the profiles table failed.
    #[error("failed to create the profiles schema")]
    CreateSchema {
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Profile store keeping one JSON document per user in `SQLite`.
pub struct SqliteProfileStore {
    connection: Mutex<Connection>,
    watchers: Watchers<TasteProfile>,
}

impl std::fmt::Debug for SqliteProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteProfileStore")
            .field("watchers", &self.watchers)
            .finish_non_exhaustive()
    }
}

impl SqliteProfileStore {
    /// Open (creating if absent) a store at `path`.
    ///
    /// # Errors
    /// Returns [`SqliteProfileStoreError`] when the database cannot be
    /// opened or the schema cannot be created.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteProfileStoreError> {
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            SqliteProfileStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::with_connection(connection)
    }

    /// Open an in-memory store, useful for tests and ephemeral sessions.
    ///
    /// # Errors
    /// Returns [`SqliteProfileStoreError`] when the in-memory database
    /// cannot be initialised.
    pub fn open_in_memory() -> Result<Self, SqliteProfileStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| {
            SqliteProfileStoreError::OpenDatabase {
                path: Utf8PathBuf::from(":memory:"),
                source,
            }
        })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteProfileStoreError> {
        connection
            .execute(SCHEMA_SQL, [])
            .map_err(|source| SqliteProfileStoreError::CreateSchema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
            watchers: Watchers::new(),
        })
    }

    /// Subscribe to successful writes; the callback receives each stored
    /// document. The subscription lives until the handle is dropped or
    /// detached.
    pub fn subscribe(
        &self,
        callback: impl Fn(&TasteProfile) + Send + Sync + 'static,
    ) -> WatchHandle<TasteProfile> {
        self.watchers.subscribe(callback)
    }
}

impl ProfileStore for SqliteProfileStore {
    fn get(&self, user_id: &str) -> Result<Option<TasteProfile>, StoreError> {
        let connection = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let document: Option<String> = connection
            .query_row(
                "SELECT document FROM profiles WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| StoreError::read(user_id, source))?;

        document
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(|source| StoreError::read(user_id, source))
    }

    fn put(&self, user_id: &str, profile: &TasteProfile) -> Result<(), StoreError> {
        let document =
            serde_json::to_string(profile).map_err(|source| StoreError::write(user_id, source))?;
        {
            let connection = self
                .connection
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            connection
                .execute(
                    "INSERT INTO profiles (user_id, document) VALUES (?1, ?2)
                     ON CONFLICT(user_id) DO UPDATE SET document = excluded.document",
                    (user_id, document.as_str()),
                )
                .map_err(|source| StoreError::write(user_id, source))?;
        }
        self.watchers.notify(profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "tests should fail fast when setup breaks"
    )]

    use super::*;
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[fixture]
    fn store() -> SqliteProfileStore {
        SqliteProfileStore::open_in_memory().expect("open in-memory store")
    }

    fn profile_with_data(user_id: &str, data_points: u32) -> TasteProfile {
        let mut profile = TasteProfile::empty(user_id, Utc::now());
        profile.data_points = data_points;
        profile.confidence_score = TasteProfile::confidence_for(data_points);
        profile
    }

    #[rstest]
    fn missing_user_reads_as_none(store: SqliteProfileStore) {
        assert!(store.get("nobody").expect("read").is_none());
    }

    #[rstest]
    fn stored_document_round_trips(store: SqliteProfileStore) {
        let profile = profile_with_data("u1", 7);
        store.put("u1", &profile).expect("write");
        let read = store.get("u1").expect("read").expect("present");
        assert_eq!(read, profile);
    }

    #[rstest]
    fn put_overwrites_the_previous_document(store: SqliteProfileStore) {
        store.put("u1", &profile_with_data("u1", 3)).expect("write");
        let replacement = profile_with_data("u1", 21);
        store.put("u1", &replacement).expect("overwrite");
        let read = store.get("u1").expect("read").expect("present");
        assert_eq!(read, replacement);
    }

    #[rstest]
    fn users_are_isolated(store: SqliteProfileStore) {
        store.put("u1", &profile_with_data("u1", 3)).expect("write");
        store.put("u2", &profile_with_data("u2", 9)).expect("write");
        let read = store.get("u2").expect("read").expect("present");
        assert_eq!(read.data_points, 9);
    }

    #[rstest]
    fn corrupt_document_is_a_read_error(store: SqliteProfileStore) {
        {
            let connection = store
                .connection
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            connection
                .execute(
                    "INSERT INTO profiles (user_id, document) VALUES ('u1', 'not-json')",
                    [],
                )
                .expect("insert corrupt row");
        }
        let err = store.get("u1").expect_err("corrupt document should error");
        assert!(matches!(err, StoreError::Read { .. }));
    }

    #[rstest]
    fn writes_notify_subscribers(store: SqliteProfileStore) {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let handle = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.put("u1", &profile_with_data("u1", 1)).expect("write");
        handle.detach();
        store.put("u1", &profile_with_data("u1", 2)).expect("write");

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn open_persists_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("profiles.db"))
            .expect("utf8 database path");

        {
            let disk_store = SqliteProfileStore::open(&path).expect("open store");
            disk_store
                .put("u1", &profile_with_data("u1", 5))
                .expect("write");
        }

        let reopened = SqliteProfileStore::open(&path).expect("reopen store");
        let read = reopened.get("u1").expect("read").expect("present");
        assert_eq!(read.data_points, 5);
    }
}
