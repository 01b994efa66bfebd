use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use riskops_core::quotes::{NewQuote, Quote, QuoteStoreTrait};
use riskops_core::Result;

use super::model::QuoteDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{OrNotFound, StorageError};
use crate::schema::{assets, quotes};

/// Quote history used by the price source
pub struct QuoteRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl QuoteRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl QuoteStoreTrait for QuoteRepository {
    async fn save_quote(&self, quote: NewQuote) -> Result<Quote> {
        quote.validate()?;
        let row: QuoteDB = quote.into();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Quote> {
                assets::table
                    .find(&row.asset_id)
                    .select(assets::id)
                    .first::<String>(conn)
                    .or_not_found("Asset", &row.asset_id)?;

                let stored = diesel::insert_into(quotes::table)
                    .values(&row)
                    .get_result::<QuoteDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(Quote::try_from(stored)?)
            })
            .await
    }

    fn latest_quote_before(&self, asset_id: &str, as_of: DateTime<Utc>) -> Result<Option<Quote>> {
        let mut conn = get_connection(&self.pool)?;
        let row = quotes::table
            .select(QuoteDB::as_select())
            .filter(quotes::asset_id.eq(asset_id))
            .filter(quotes::quoted_at.le(as_of.naive_utc()))
            .order((quotes::quoted_at.desc(), quotes::created_at.desc()))
            .first::<QuoteDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Quote::try_from).transpose()?)
    }
}
