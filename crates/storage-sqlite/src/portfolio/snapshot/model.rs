//! Database model for portfolio snapshots.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde_json::{Map, Value};

use riskops_core::portfolio::PortfolioSnapshot;

use crate::errors::StorageError;
use crate::utils::{decimal_from_text, decimal_to_text};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolio_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioSnapshotDB {
    pub id: String,
    pub portfolio_id: String,
    pub portfolio_version_id: String,
    pub total_value: String,
    pub currency: String,
    pub snapshot_date: NaiveDate,
    /// JSON object
    pub metadata: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<&PortfolioSnapshot> for PortfolioSnapshotDB {
    type Error = StorageError;

    fn try_from(domain: &PortfolioSnapshot) -> Result<Self, Self::Error> {
        let metadata = serde_json::to_string(&domain.metadata)
            .map_err(|e| StorageError::decode("portfolio_snapshots.metadata", e))?;
        Ok(Self {
            id: domain.id.clone(),
            portfolio_id: domain.portfolio_id.clone(),
            portfolio_version_id: domain.portfolio_version_id.clone(),
            total_value: decimal_to_text(domain.total_value),
            currency: domain.currency.clone(),
            snapshot_date: domain.snapshot_date,
            metadata,
            created_at: domain.created_at,
        })
    }
}

impl TryFrom<PortfolioSnapshotDB> for PortfolioSnapshot {
    type Error = StorageError;

    fn try_from(db: PortfolioSnapshotDB) -> Result<Self, Self::Error> {
        let metadata: Map<String, Value> = serde_json::from_str(&db.metadata)
            .map_err(|e| StorageError::decode("portfolio_snapshots.metadata", e))?;
        Ok(Self {
            total_value: decimal_from_text("portfolio_snapshots.total_value", &db.total_value)?,
            id: db.id,
            portfolio_id: db.portfolio_id,
            portfolio_version_id: db.portfolio_version_id,
            currency: db.currency,
            snapshot_date: db.snapshot_date,
            metadata,
            created_at: db.created_at,
        })
    }
}
