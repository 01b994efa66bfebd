use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use riskops_core::portfolio::{PortfolioSnapshot, SnapshotRepositoryTrait};
use riskops_core::Result;

use super::model::PortfolioSnapshotDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{OrNotFound, StorageError};
use crate::schema::portfolio_snapshots;

/// Append-only store of portfolio snapshots
pub struct SnapshotRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SnapshotRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

fn into_snapshots(rows: Vec<PortfolioSnapshotDB>) -> std::result::Result<Vec<PortfolioSnapshot>, StorageError> {
    rows.into_iter().map(PortfolioSnapshot::try_from).collect()
}

#[async_trait]
impl SnapshotRepositoryTrait for SnapshotRepository {
    async fn insert_snapshot(&self, snapshot: PortfolioSnapshot) -> Result<PortfolioSnapshot> {
        let row = PortfolioSnapshotDB::try_from(&snapshot)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PortfolioSnapshot> {
                let stored = diesel::insert_into(portfolio_snapshots::table)
                    .values(&row)
                    .get_result::<PortfolioSnapshotDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(PortfolioSnapshot::try_from(stored)?)
            })
            .await
    }

    fn get_by_id(&self, snapshot_id: &str) -> Result<PortfolioSnapshot> {
        let mut conn = get_connection(&self.pool)?;
        let row = portfolio_snapshots::table
            .select(PortfolioSnapshotDB::as_select())
            .find(snapshot_id)
            .first::<PortfolioSnapshotDB>(&mut conn)
            .or_not_found("Snapshot", snapshot_id)?;
        Ok(PortfolioSnapshot::try_from(row)?)
    }

    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = portfolio_snapshots::table
            .select(PortfolioSnapshotDB::as_select())
            .filter(portfolio_snapshots::portfolio_id.eq(portfolio_id))
            .order((
                portfolio_snapshots::snapshot_date.desc(),
                portfolio_snapshots::created_at.desc(),
            ))
            .load::<PortfolioSnapshotDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(into_snapshots(rows)?)
    }

    fn latest_for_version(&self, version_id: &str) -> Result<Option<PortfolioSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let row = portfolio_snapshots::table
            .select(PortfolioSnapshotDB::as_select())
            .filter(portfolio_snapshots::portfolio_version_id.eq(version_id))
            .order((
                portfolio_snapshots::snapshot_date.desc(),
                portfolio_snapshots::created_at.desc(),
            ))
            .first::<PortfolioSnapshotDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PortfolioSnapshot::try_from).transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::setup_db;
    use chrono::NaiveDate;
    use diesel::RunQueryDsl;
    use riskops_core::errors::ErrorKind;
    use riskops_core::portfolio::snapshot::record_snapshot;
    use riskops_core::portfolio::PortfolioVersion;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn seed_version(pool: &Arc<crate::db::DbPool>, portfolio_id: &str, version_id: &str) -> PortfolioVersion {
        let mut conn = get_connection(pool).unwrap();
        diesel::sql_query(format!(
            "INSERT OR IGNORE INTO portfolios (id, name, is_active, created_at, updated_at)
             VALUES ('{portfolio_id}', 'Seed', 1, '2026-01-01 00:00:00', '2026-01-01 00:00:00')"
        ))
        .execute(&mut conn)
        .unwrap();
        diesel::sql_query(format!(
            "INSERT INTO portfolio_versions (id, portfolio_id, version_number, created_at)
             VALUES ('{version_id}', '{portfolio_id}',
                     (SELECT COALESCE(MAX(version_number), 0) + 1 FROM portfolio_versions WHERE portfolio_id = '{portfolio_id}'),
                     '2026-01-01 00:00:00')"
        ))
        .execute(&mut conn)
        .unwrap();
        PortfolioVersion {
            id: version_id.to_string(),
            portfolio_id: portfolio_id.to_string(),
            version_number: 1,
            description: None,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            created_by: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[tokio::test]
    async fn insert_and_read_back_with_metadata() {
        let (_dir, pool, writer) = setup_db();
        let version = seed_version(&pool, "p1", "v1");
        let repo = SnapshotRepository::new(pool, writer);

        let mut metadata = serde_json::Map::new();
        metadata.insert("source".to_string(), json!("nightly"));
        metadata.insert("allocations".to_string(), json!({"stock": "60", "bond": "40"}));
        let snapshot =
            record_snapshot(&version, dec!(12345.6789), "usd", day(2), Some(metadata)).unwrap();

        let stored = repo.insert_snapshot(snapshot.clone()).await.unwrap();
        assert_eq!(stored.total_value, dec!(12345.6789));
        assert_eq!(stored.currency, "USD");

        let fetched = repo.get_by_id(&snapshot.id).unwrap();
        assert_eq!(fetched.metadata["source"], json!("nightly"));
        assert_eq!(fetched.metadata["allocations"]["bond"], json!("40"));
        assert_eq!(fetched.snapshot_date, day(2));
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_scoped() {
        let (_dir, pool, writer) = setup_db();
        let v1 = seed_version(&pool, "p1", "v1");
        let v2 = seed_version(&pool, "p1", "v2");
        let other = seed_version(&pool, "p2", "v3");
        let repo = SnapshotRepository::new(pool, writer);

        for (version, date, value) in [
            (&v1, day(1), dec!(100)),
            (&v1, day(5), dec!(110)),
            (&v2, day(3), dec!(120)),
            (&other, day(9), dec!(1)),
        ] {
            let snapshot = record_snapshot(version, value, "USD", date, None).unwrap();
            repo.insert_snapshot(snapshot).await.unwrap();
        }

        let dates: Vec<NaiveDate> = repo
            .list_by_portfolio("p1")
            .unwrap()
            .iter()
            .map(|s| s.snapshot_date)
            .collect();
        assert_eq!(dates, vec![day(5), day(3), day(1)]);

        let latest = repo.latest_for_version("v1").unwrap().unwrap();
        assert_eq!(latest.total_value, dec!(110));
        assert!(repo.latest_for_version("missing").unwrap().is_none());
        assert_eq!(
            repo.get_by_id("missing").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
