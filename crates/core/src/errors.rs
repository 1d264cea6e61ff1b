//! Error types shared by every Simvest crate.
//!
//! Nothing here names a storage engine. The SQLite crate maps its own
//! failures onto [`DatabaseError`] before they reach a service.

use thiserror::Error;

use crate::trading::TradeError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage failure: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Rejected trade or portfolio action, surfaced to the user as-is.
    #[error("{0}")]
    Trade(#[from] TradeError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn as_trade_error(&self) -> Option<&TradeError> {
        match self {
            Error::Trade(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_write_conflict(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::WriteConflict(_)))
    }

    /// True for failures caused by the caller rather than the system.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Trade(_) | Error::Validation(_))
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("no pooled connection available: {0}")]
    PoolUnavailable(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("duplicate row: {0}")]
    UniqueViolation(String),

    #[error("dangling reference: {0}")]
    ForeignKeyViolation(String),

    /// Stored state moved on since the write was planned. Safe to retry.
    #[error("write conflict: {0}")]
    WriteConflict(String),

    #[error("schema migration failed: {0}")]
    MigrationFailed(String),

    /// Writer actor or row codec failure.
    #[error("storage internals: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("malformed decimal: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("malformed catalog entry: {0}")]
    Catalog(String),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::Catalog(err.to_string()))
    }
}
