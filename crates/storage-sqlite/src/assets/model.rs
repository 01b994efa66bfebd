//! Database model for assets.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use riskops_core::assets::{Asset, AssetType, NewAsset};

use crate::errors::StorageError;

/// Database model for assets
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub ticker: String,
    pub exchange: Option<String>,
    pub asset_type: String,
    pub name: String,
    pub currency: String,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub isin: Option<String>,
    pub cusip: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AssetDB> for Asset {
    type Error = StorageError;

    fn try_from(db: AssetDB) -> Result<Self, Self::Error> {
        let asset_type = db
            .asset_type
            .parse::<AssetType>()
            .map_err(|e| StorageError::decode("assets.asset_type", e))?;
        Ok(Self {
            id: db.id,
            ticker: db.ticker,
            exchange: db.exchange,
            asset_type,
            name: db.name,
            currency: db.currency,
            sector: db.sector,
            country: db.country,
            isin: db.isin,
            cusip: db.cusip,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewAsset> for AssetDB {
    fn from(domain: NewAsset) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: domain.name.unwrap_or_else(|| domain.ticker.clone()),
            ticker: domain.ticker,
            exchange: domain.exchange,
            asset_type: domain.asset_type.as_str().to_string(),
            currency: domain.currency,
            sector: domain.sector,
            country: domain.country,
            isin: domain.isin,
            cusip: domain.cusip,
            is_active: domain.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

pub(crate) fn into_assets(rows: Vec<AssetDB>) -> Result<Vec<Asset>, StorageError> {
    rows.into_iter().map(Asset::try_from).collect()
}
