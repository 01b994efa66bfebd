//! Storage-specific error types for SQLite operations.
//!
//! Diesel, r2d2 and decoding failures are wrapped here and converted to the
//! database-agnostic errors of `riskops_core` before they leave the crate.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use riskops_core::errors::{DatabaseError, Error};

/// Storage-specific errors that wrap Diesel and r2d2 types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be decoded into its domain type.
    #[error("Corrupt column {column}: {message}")]
    Decode {
        column: &'static str,
        message: String,
    },

    #[error("Writer unavailable: {0}")]
    WriterUnavailable(String),

    /// A domain error raised inside a writer job. Carried as-is so its kind survives.
    #[error(transparent)]
    CoreError(Error),
}

impl StorageError {
    pub fn decode(column: &'static str, message: impl ToString) -> Self {
        StorageError::Decode {
            column,
            message: message.to_string(),
        }
    }
}

impl From<Error> for StorageError {
    fn from(err: Error) -> Self {
        StorageError::CoreError(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => {
                Error::Database(DatabaseError::PoolCreationFailed(e.to_string()))
            }
            StorageError::QueryFailed(DieselError::NotFound) => {
                Error::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                info,
            )) => Error::Database(DatabaseError::UniqueViolation(info.message().to_string())),
            StorageError::QueryFailed(DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                info,
            )) => Error::Database(DatabaseError::ForeignKeyViolation(
                info.message().to_string(),
            )),
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::MigrationFailed(e) => Error::Database(DatabaseError::MigrationFailed(e)),
            StorageError::Decode { column, message } => Error::Database(DatabaseError::Internal(
                format!("{}: {}", column, message),
            )),
            StorageError::WriterUnavailable(e) => {
                Error::Database(DatabaseError::TransactionFailed(e))
            }
            StorageError::CoreError(e) => e,
        }
    }
}

/// Extension trait for converting Diesel and r2d2 results to core results.
///
/// `From<DieselError> for Error` is not possible because of orphan rules, so the
/// conversion goes through [`StorageError`].
pub trait IntoCore<T> {
    fn into_core(self) -> riskops_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> riskops_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

impl<T> IntoCore<T> for std::result::Result<T, r2d2::Error> {
    fn into_core(self) -> riskops_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}

/// Maps a missing row to a typed `NotFound` instead of the generic database one.
pub trait OrNotFound<T> {
    fn or_not_found(self, entity: &'static str, id: &str) -> riskops_core::Result<T>;
}

impl<T> OrNotFound<T> for std::result::Result<T, DieselError> {
    fn or_not_found(self, entity: &'static str, id: &str) -> riskops_core::Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(DieselError::NotFound) => Err(Error::not_found(entity, id)),
            Err(e) => Err(StorageError::from(e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskops_core::errors::ErrorKind;

    #[test]
    fn core_errors_survive_the_round_trip() {
        let storage: StorageError = Error::not_found("Portfolio", "p1").into();
        let core: Error = storage.into();
        assert_eq!(core.kind(), ErrorKind::NotFound);
        assert!(core.to_string().contains("p1"));
    }

    #[test]
    fn missing_rows_become_typed_not_found() {
        let result: std::result::Result<(), DieselError> = Err(DieselError::NotFound);
        let err = result.or_not_found("Snapshot", "s1").unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "Snapshot", .. }));
    }

    #[test]
    fn decode_failures_are_database_errors() {
        let core: Error = StorageError::decode("positions.weight", "bad digit").into();
        assert_eq!(core.kind(), ErrorKind::Database);
    }
}
