//! Price source backed by stored quotes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;

use super::model::Price;
use super::store::{PriceSourceTrait, QuoteStoreTrait};
use crate::errors::{Error, Result};

/// Serves the latest stored quote at or before the requested time, rejecting
/// quotes older than `max_age`.
pub struct QuotePriceSource {
    store: Arc<dyn QuoteStoreTrait>,
    max_age: Duration,
}

impl QuotePriceSource {
    pub fn new(store: Arc<dyn QuoteStoreTrait>, max_age: Duration) -> Self {
        Self { store, max_age }
    }
}

#[async_trait]
impl PriceSourceTrait for QuotePriceSource {
    async fn price_of(&self, asset_id: &str, as_of: DateTime<Utc>) -> Result<Price> {
        let quote = self
            .store
            .latest_quote_before(asset_id, as_of)?
            .ok_or_else(|| Error::not_found("Price", format!("{} as of {}", asset_id, as_of)))?;

        if as_of - quote.quoted_at > self.max_age {
            debug!(
                "Quote {} for asset {} at {} is older than {} seconds",
                quote.id,
                asset_id,
                quote.quoted_at,
                self.max_age.num_seconds()
            );
            return Err(Error::Stale {
                asset_id: asset_id.to_string(),
                quoted_at: quote.quoted_at,
                as_of,
            });
        }

        Ok(quote.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::quotes::NewQuote;
    use crate::test_support::MockQuoteStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 16, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn returns_latest_quote_before_as_of() {
        let store = Arc::new(MockQuoteStore::default());
        for (day, price) in [(1, dec!(10)), (3, dec!(12)), (5, dec!(15))] {
            store
                .save_quote(NewQuote {
                    asset_id: "a1".to_string(),
                    price,
                    currency: "USD".to_string(),
                    quoted_at: at(day),
                })
                .await
                .unwrap();
        }
        let source = QuotePriceSource::new(store, Duration::days(7));

        let price = source.price_of("a1", at(4)).await.unwrap();
        assert_eq!(price.price, dec!(12));
        assert_eq!(price.as_of, at(3));
    }

    #[tokio::test]
    async fn missing_quote_is_not_found() {
        let store = Arc::new(MockQuoteStore::default());
        let source = QuotePriceSource::new(store, Duration::days(7));

        let err = source.price_of("a1", at(4)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn old_quote_is_stale() {
        let store = Arc::new(MockQuoteStore::default());
        store
            .save_quote(NewQuote {
                asset_id: "a1".to_string(),
                price: dec!(10),
                currency: "USD".to_string(),
                quoted_at: at(1),
            })
            .await
            .unwrap();
        let source = QuotePriceSource::new(store, Duration::days(2));

        let err = source.price_of("a1", at(10)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Stale);
    }
}
