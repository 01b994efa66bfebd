//! SQLite storage implementation for RiskOps.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `riskops-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for assets, portfolios, snapshots and quotes
//! - Database-specific model types (with Diesel derives)
//!
//! ```text
//!   core (domain, traits)
//!            │
//!            ▼
//!   storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod assets;
pub mod portfolio;
pub mod quotes;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    PoolOptions, WriteHandle,
};

pub use assets::AssetRepository;
pub use portfolio::snapshot::SnapshotRepository;
pub use portfolio::PortfolioRepository;
pub use quotes::QuoteRepository;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from riskops-core for convenience
pub use riskops_core::errors::{DatabaseError, Error, Result};
