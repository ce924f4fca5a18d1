//! Error types for exocomp-sync.

use thiserror::Error;

/// Run-level errors. Per-entity failures never surface here; they are
/// recorded as [`SyncOutcome::Error`](crate::SyncOutcome::Error) instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The entity store could not list the ids to process.
    #[error("failed to list entities")]
    Listing {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `Bot::run_module` was asked for a name nobody registered.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// JSON serialization error (statistics report).
    #[error("could not serialize statistics")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::testing::MemoryStoreError;

    #[test]
    fn listing_cause_is_reported_through_source_only() {
        let err = SyncError::Listing {
            source: Box::new(MemoryStoreError::ListingUnavailable),
        };
        assert_eq!(err.to_string(), "failed to list entities");
        assert_eq!(
            err.source().map(|cause| cause.to_string()).as_deref(),
            Some("listing is unavailable")
        );
    }
}
