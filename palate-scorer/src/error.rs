//! Errors surfaced by the taste profile engine.

use palate_core::StoreError;
use thiserror::Error;

/// Failure modes of engine operations.
///
/// Source feed failures never appear here: a failed feed degrades to an
/// empty contribution and is reported through the diagnostics channel
/// instead. Only the profile store can fail an operation outright.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Computing or persisting a profile failed at the store.
    #[error("failed to compute taste profile for {user_id}")]
    Compute {
        /// User whose profile was being computed.
        user_id: String,
        /// Store failure that aborted the operation.
        #[source]
        source: StoreError,
    },
    /// Resetting a profile failed at the store.
    #[error("failed to reset taste profile for {user_id}")]
    Reset {
        /// User whose profile was being reset.
        user_id: String,
        /// Store failure that aborted the operation.
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    /// Wrap a store failure during compute.
    #[must_use]
    pub fn compute(user_id: impl Into<String>, source: StoreError) -> Self {
        Self::Compute {
            user_id: user_id.into(),
            source,
        }
    }

    /// Wrap a store failure during reset.
    #[must_use]
    pub fn reset(user_id: impl Into<String>, source: StoreError) -> Self {
        Self::Reset {
            user_id: user_id.into(),
            source,
        }
    }
}
