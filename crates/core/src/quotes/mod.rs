//! Price lookup module.
//!
//! - [`model`] - Domain models for quotes and resolved prices
//! - [`store`] - The price source consumed by valuation, and the quote store behind it
//! - `price_source` - [`QuotePriceSource`], the staleness-checked adapter over a quote store
//!
//! Valuation only ever sees [`PriceSourceTrait`]. The storage crate persists quotes
//! behind [`QuoteStoreTrait`].

pub mod model;
mod price_source;
pub mod store;

pub use model::{NewQuote, Price, Quote};
pub use price_source::QuotePriceSource;
pub use store::{PriceSourceTrait, QuoteStoreTrait};
