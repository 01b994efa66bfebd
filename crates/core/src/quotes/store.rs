//! Price source and quote storage traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{NewQuote, Price, Quote};
use crate::errors::Result;

/// Last known price lookup used by valuation.
#[async_trait]
pub trait PriceSourceTrait: Send + Sync {
    /// Returns the last known price for `asset_id` at or before `as_of`.
    ///
    /// Fails with `NotFound` when no price exists and with `Stale` when the
    /// latest price is too old to be used.
    async fn price_of(&self, asset_id: &str, as_of: DateTime<Utc>) -> Result<Price>;
}

/// Storage interface for quote data.
#[async_trait]
pub trait QuoteStoreTrait: Send + Sync {
    async fn save_quote(&self, quote: NewQuote) -> Result<Quote>;

    /// Latest quote at or before `as_of`, regardless of age.
    fn latest_quote_before(&self, asset_id: &str, as_of: DateTime<Utc>) -> Result<Option<Quote>>;
}
