//! Error types shared by the store, aggregator, evaluator and report composer.
//!
//! Callers get exactly two kinds of failure: bad input (`Validation`) and a
//! broken persistence layer (`Storage`). Neither is retried here.

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum LedgerError {
    /// Caller-supplied input violates a constraint. Nothing was written.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The underlying store failed. Nothing was written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("corrupt {column} in {table} row {id}: {detail}")]
    Corrupt {
        table: &'static str,
        column: &'static str,
        id: i64,
        detail: String,
    },

    #[error("database schema version {found} is newer than this build supports ({supported})")]
    UnsupportedVersion { found: i32, supported: i32 },

    /// Stored amounts add up to more than a `Decimal` can hold.
    #[error("{0} total is too large to compute")]
    Overflow(&'static str),

    #[error("{0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.into())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.into())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(e: csv::Error) -> Self {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => io.into(),
            other => Self::Storage(StorageError::Unavailable(format!("CSV write failed: {other:?}"))),
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, LedgerError>;
