//! Core error types for the RiskOps portfolio engine.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::{DateTime, ParseError as ChronoParseError, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the portfolio engine.
///
/// Every variant maps to a stable [`ErrorKind`] through [`Error::kind`], which is
/// what transports should surface to callers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Valuation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Unknown asset {ticker} (exchange: {}, type: {asset_type})", exchange.as_deref().unwrap_or("-"))]
    UnknownAsset {
        ticker: String,
        exchange: Option<String>,
        asset_type: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Price for asset {asset_id} is stale: last quote at {quoted_at}, requested as of {as_of}")]
    Stale {
        asset_id: String,
        quoted_at: DateTime<Utc>,
        as_of: DateTime<Utc>,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns the stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Database(DatabaseError::NotFound(_)) => ErrorKind::NotFound,
            Error::Database(_) => ErrorKind::Database,
            Error::Validation(e) => e.kind(),
            Error::Calculation(e) => e.kind(),
            Error::UnknownAsset { .. } => ErrorKind::UnknownAsset,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Stale { .. } => ErrorKind::Stale,
            Error::Unexpected(_) => ErrorKind::Internal,
        }
    }
}

/// Stable error classification exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidPositionData,
    InvalidQuantity,
    InvalidWeight,
    EmptyPortfolioName,
    EmptyPositions,
    UnknownAsset,
    InconsistentAllocation,
    MissingBasisValue,
    NotFound,
    Stale,
    InvalidInput,
    Database,
    Internal,
}

impl ErrorKind {
    /// Returns the wire code for this kind.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidPositionData => "INVALID_POSITION_DATA",
            ErrorKind::InvalidQuantity => "INVALID_QUANTITY",
            ErrorKind::InvalidWeight => "INVALID_WEIGHT",
            ErrorKind::EmptyPortfolioName => "EMPTY_PORTFOLIO_NAME",
            ErrorKind::EmptyPositions => "EMPTY_POSITIONS",
            ErrorKind::UnknownAsset => "UNKNOWN_ASSET",
            ErrorKind::InconsistentAllocation => "INCONSISTENT_ALLOCATION",
            ErrorKind::MissingBasisValue => "MISSING_BASIS_VALUE",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Stale => "STALE",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Database => "DATABASE_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for positions, portfolios and raw input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Position {index} ({ticker}) must have exactly one of quantity or weight")]
    InvalidPositionData { index: usize, ticker: String },

    #[error("Position {index} ({ticker}): quantity must be greater than 0, got {quantity}")]
    InvalidQuantity {
        index: usize,
        ticker: String,
        quantity: Decimal,
    },

    #[error("Position {index} ({ticker}): weight must be greater than 0 and at most 100, got {weight}")]
    InvalidWeight {
        index: usize,
        ticker: String,
        weight: Decimal,
    },

    #[error("Portfolio name cannot be empty")]
    EmptyPortfolioName,

    #[error("Portfolio must have at least one position")]
    EmptyPositions,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::InvalidPositionData { .. } => ErrorKind::InvalidPositionData,
            ValidationError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            ValidationError::InvalidWeight { .. } => ErrorKind::InvalidWeight,
            ValidationError::EmptyPortfolioName => ErrorKind::EmptyPortfolioName,
            ValidationError::EmptyPositions => ErrorKind::EmptyPositions,
            ValidationError::InvalidInput(_) | ValidationError::DateTimeParse(_) => {
                ErrorKind::InvalidInput
            }
        }
    }
}

/// Errors raised by the valuation and allocation engine.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Weight-based positions sum to {total_weight}% which leaves no room for the remaining positions")]
    InconsistentAllocation { total_weight: Decimal },

    #[error("Version {version_id} only has weight-based positions; a basis value is required")]
    MissingBasisValue { version_id: String },

    #[error("No price resolved for asset {0}")]
    MissingPrice(String),

    #[error("Negative price {price} for asset {asset_id}")]
    NegativePrice { asset_id: String, price: Decimal },

    #[error("Basis value must not be negative, got {0}")]
    NegativeBasis(Decimal),

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

impl CalculatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalculatorError::InconsistentAllocation { .. } => ErrorKind::InconsistentAllocation,
            CalculatorError::MissingBasisValue { .. } => ErrorKind::MissingBasisValue,
            CalculatorError::MissingPrice(_) => ErrorKind::NotFound,
            CalculatorError::NegativePrice { .. } | CalculatorError::NegativeBasis(_) => {
                ErrorKind::InvalidInput
            }
            CalculatorError::Overflow(_) => ErrorKind::InvalidInput,
        }
    }
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
