//! RiskOps Core - Domain entities, services, and traits.
//!
//! This crate contains the portfolio versioning and valuation engine.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod assets;
pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod quotes;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export common types from asset and portfolio modules
pub use assets::*;
pub use portfolio::*;
pub use quotes::{NewQuote, Price, PriceSourceTrait, Quote, QuotePriceSource, QuoteStoreTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
