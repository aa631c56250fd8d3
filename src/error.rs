// ABOUTME: Error taxonomy for a sync run
// ABOUTME: Separates unreachable collaborators, bad tracker input and failed writes

use thiserror::Error;

use crate::store::StoreError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a sync run stopped before completing.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The spreadsheet or the database could not be reached.
    #[error("connection failure while {stage}")]
    Connection {
        stage: &'static str,
        #[source]
        source: BoxError,
    },

    /// The change tracker holds an entry that is not a positive row number.
    #[error("change tracker row {tracker_row} holds {value:?}, expected a positive row number")]
    MalformedInput { tracker_row: u32, value: String },

    /// The upsert failed and its transaction was rolled back.
    #[error("failed to persist problems")]
    Persistence {
        #[source]
        source: BoxError,
    },
}

impl SyncError {
    pub fn connection(stage: &'static str, source: impl Into<BoxError>) -> Self {
        SyncError::Connection {
            stage,
            source: source.into(),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Pool(_) => SyncError::connection("acquiring a database connection", err),
            other => SyncError::Persistence {
                source: Box::new(other),
            },
        }
    }
}
