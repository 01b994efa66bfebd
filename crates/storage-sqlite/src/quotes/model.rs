//! Database model for quotes.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use riskops_core::quotes::{NewQuote, Quote};

use crate::errors::StorageError;
use crate::utils::{decimal_from_text, decimal_to_text};

/// Database model for quotes. Times are stored as naive UTC.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuoteDB {
    pub id: String,
    pub asset_id: String,
    pub price: String,
    pub currency: String,
    pub quoted_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl From<NewQuote> for QuoteDB {
    fn from(domain: NewQuote) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            asset_id: domain.asset_id.trim().to_string(),
            price: decimal_to_text(domain.price),
            currency: domain.currency.trim().to_uppercase(),
            quoted_at: domain.quoted_at.naive_utc(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

impl TryFrom<QuoteDB> for Quote {
    type Error = StorageError;

    fn try_from(db: QuoteDB) -> Result<Self, Self::Error> {
        Ok(Self {
            price: decimal_from_text("quotes.price", &db.price)?,
            id: db.id,
            asset_id: db.asset_id,
            currency: db.currency,
            quoted_at: db.quoted_at.and_utc(),
            created_at: db.created_at.and_utc(),
        })
    }
}
