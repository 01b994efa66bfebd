//! Quote domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::Error;

/// A stored market quote for an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub asset_id: String,
    pub price: Decimal,
    pub currency: String,
    pub quoted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input model for recording a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    pub asset_id: String,
    pub price: Decimal,
    pub currency: String,
    pub quoted_at: DateTime<Utc>,
}

impl NewQuote {
    pub fn validate(&self) -> Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Quote asset id cannot be empty".to_string(),
            )));
        }
        if self.price.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Quote price must not be negative, got {}",
                self.price
            ))));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Quote currency cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Price per unit of an asset, in the asset's native currency, as of a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub asset_id: String,
    pub price: Decimal,
    pub currency: String,
    pub as_of: DateTime<Utc>,
}

impl From<Quote> for Price {
    fn from(quote: Quote) -> Self {
        Self {
            asset_id: quote.asset_id,
            price: quote.price,
            currency: quote.currency,
            as_of: quote.quoted_at,
        }
    }
}
