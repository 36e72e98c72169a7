//! Store error types.

use std::path::PathBuf;

/// Failure reported by the data store gateway.
///
/// Constraint violations, missing tables, locked databases and I/O failures
/// all land here; the gateway never retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open database {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;
