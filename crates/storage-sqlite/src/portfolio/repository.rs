use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;

use riskops_core::errors::Error;
use riskops_core::portfolio::{
    NewPortfolio, Portfolio, PortfolioDetail, PortfolioRepositoryTrait, PortfolioUpdate,
    PortfolioVersion, Position, VersionDraft, VersionWithPositions,
};
use riskops_core::Result;

use super::model::{PortfolioChangesetDB, PortfolioDB, PortfolioVersionDB, PositionDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{OrNotFound, StorageError};
use crate::schema::{portfolio_versions, portfolios, positions};
use crate::utils::chunk_for_sqlite;

type PortfolioWithNewVersion = (Portfolio, Option<VersionWithPositions>);

/// Repository for portfolios and their immutable versions.
///
/// Every write goes through the writer actor. Version numbering reads the
/// current maximum and inserts inside the same immediate transaction.
pub struct PortfolioRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }

    fn load_positions(
        conn: &mut SqliteConnection,
        version_ids: &[String],
    ) -> std::result::Result<HashMap<String, Vec<Position>>, StorageError> {
        let mut grouped: HashMap<String, Vec<Position>> = HashMap::new();
        for chunk in chunk_for_sqlite(version_ids) {
            let rows = positions::table
                .select(PositionDB::as_select())
                .filter(positions::portfolio_version_id.eq_any(chunk))
                .order((positions::portfolio_version_id.asc(), positions::sort_order.asc()))
                .load::<PositionDB>(conn)?;
            for row in rows {
                let position = Position::try_from(row)?;
                grouped
                    .entry(position.portfolio_version_id.clone())
                    .or_default()
                    .push(position);
            }
        }
        Ok(grouped)
    }

    fn insert_version_rows(
        conn: &mut SqliteConnection,
        version: &VersionWithPositions,
    ) -> std::result::Result<(), StorageError> {
        diesel::insert_into(portfolio_versions::table)
            .values(PortfolioVersionDB::from(&version.version))
            .execute(conn)?;
        let rows: Vec<PositionDB> = version
            .positions
            .iter()
            .enumerate()
            .map(|(index, position)| PositionDB::from_domain(position, index as i32))
            .collect();
        diesel::insert_into(positions::table)
            .values(&rows)
            .execute(conn)?;
        Ok(())
    }

    fn latest_number_in(
        conn: &mut SqliteConnection,
        portfolio_id: &str,
    ) -> std::result::Result<i32, StorageError> {
        let latest: Option<i32> = portfolio_versions::table
            .filter(portfolio_versions::portfolio_id.eq(portfolio_id))
            .select(max(portfolio_versions::version_number))
            .first(conn)?;
        Ok(latest.unwrap_or(0))
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for PortfolioRepository {
    async fn create_portfolio(
        &self,
        new_portfolio: NewPortfolio,
        first_version: VersionDraft,
    ) -> Result<PortfolioDetail> {
        if let Some(id) = new_portfolio.id.as_deref() {
            if id != first_version.portfolio_id {
                return Err(Error::Unexpected(format!(
                    "First version belongs to {}, not to portfolio {}",
                    first_version.portfolio_id, id
                )));
            }
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PortfolioDetail> {
                let version = first_version.into_version(0);
                let portfolio_db = PortfolioDB::new(
                    new_portfolio,
                    version.version.portfolio_id.clone(),
                    version.version.id.clone(),
                    version.version.created_at,
                );
                let portfolio_db = diesel::insert_into(portfolios::table)
                    .values(&portfolio_db)
                    .get_result::<PortfolioDB>(conn)
                    .map_err(StorageError::from)?;
                Self::insert_version_rows(conn, &version)?;

                Ok(PortfolioDetail {
                    portfolio: portfolio_db.into(),
                    versions: vec![version],
                })
            })
            .await
    }

    async fn update_portfolio(
        &self,
        update: PortfolioUpdate,
        new_version: Option<VersionDraft>,
    ) -> Result<PortfolioWithNewVersion> {
        let changes = PortfolioChangesetDB {
            name: update.name,
            description: update.description.map(Some),
            updated_at: Utc::now().naive_utc(),
        };
        let portfolio_id = update.id;
        if let Some(draft) = &new_version {
            if draft.portfolio_id != portfolio_id {
                return Err(Error::Unexpected(format!(
                    "Version belongs to {}, not to portfolio {}",
                    draft.portfolio_id, portfolio_id
                )));
            }
        }

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PortfolioWithNewVersion> {
                let updated = diesel::update(
                    portfolios::table
                        .find(&portfolio_id)
                        .filter(portfolios::deleted_at.is_null()),
                )
                .set(&changes)
                .get_result::<PortfolioDB>(conn)
                .or_not_found("Portfolio", &portfolio_id)?;

                let version = match new_version {
                    Some(draft) => {
                        let latest = Self::latest_number_in(conn, &portfolio_id)?;
                        let version = draft.into_version(latest);
                        Self::insert_version_rows(conn, &version)?;
                        debug!(
                            "Inserted version {} of portfolio {}",
                            version.version.version_number, portfolio_id
                        );
                        Some(version)
                    }
                    None => None,
                };
                Ok((updated.into(), version))
            })
            .await
    }

    async fn soft_delete(&self, portfolio_id: &str, at: NaiveDateTime) -> Result<Portfolio> {
        let portfolio_id = portfolio_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let deleted = diesel::update(
                    portfolios::table
                        .find(&portfolio_id)
                        .filter(portfolios::deleted_at.is_null()),
                )
                .set((
                    portfolios::deleted_at.eq(Some(at)),
                    portfolios::is_active.eq(false),
                    portfolios::updated_at.eq(at),
                ))
                .get_result::<PortfolioDB>(conn)
                .or_not_found("Portfolio", &portfolio_id)?;
                Ok(deleted.into())
            })
            .await
    }

    async fn set_base_version(&self, portfolio_id: &str, version_id: &str) -> Result<Portfolio> {
        let portfolio_id = portfolio_id.to_string();
        let version_id = version_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let owned: i64 = portfolio_versions::table
                    .filter(portfolio_versions::id.eq(&version_id))
                    .filter(portfolio_versions::portfolio_id.eq(&portfolio_id))
                    .count()
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                if owned == 0 {
                    return Err(Error::not_found("PortfolioVersion", version_id));
                }

                let updated = diesel::update(
                    portfolios::table
                        .find(&portfolio_id)
                        .filter(portfolios::deleted_at.is_null()),
                )
                .set((
                    portfolios::base_version_id.eq(Some(version_id.clone())),
                    portfolios::updated_at.eq(Utc::now().naive_utc()),
                ))
                .get_result::<PortfolioDB>(conn)
                .or_not_found("Portfolio", &portfolio_id)?;
                Ok(updated.into())
            })
            .await
    }

    async fn insert_version(&self, draft: VersionDraft) -> Result<VersionWithPositions> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<VersionWithPositions> {
                portfolios::table
                    .find(&draft.portfolio_id)
                    .filter(portfolios::deleted_at.is_null())
                    .select(portfolios::id)
                    .first::<String>(conn)
                    .or_not_found("Portfolio", &draft.portfolio_id)?;

                let latest = Self::latest_number_in(conn, &draft.portfolio_id)?;
                let version = draft.into_version(latest);
                Self::insert_version_rows(conn, &version)?;
                debug!(
                    "Inserted version {} of portfolio {}",
                    version.version.version_number, version.version.portfolio_id
                );
                Ok(version)
            })
            .await
    }

    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;
        let portfolio = portfolios::table
            .select(PortfolioDB::as_select())
            .find(portfolio_id)
            .first::<PortfolioDB>(&mut conn)
            .or_not_found("Portfolio", portfolio_id)?;
        Ok(portfolio.into())
    }

    fn list(&self, user_id: Option<&str>) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = portfolios::table
            .select(PortfolioDB::as_select())
            .filter(portfolios::deleted_at.is_null())
            .into_boxed();
        if let Some(user_id) = user_id {
            query = query.filter(portfolios::user_id.eq(user_id));
        }
        let rows = query
            .order((portfolios::created_at.asc(), portfolios::id.asc()))
            .load::<PortfolioDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Portfolio::from).collect())
    }

    fn latest_version_number(&self, portfolio_id: &str) -> Result<i32> {
        let mut conn = get_connection(&self.pool)?;
        Ok(Self::latest_number_in(&mut conn, portfolio_id)?)
    }

    fn get_version(&self, version_id: &str) -> Result<PortfolioVersion> {
        let mut conn = get_connection(&self.pool)?;
        let version = portfolio_versions::table
            .select(PortfolioVersionDB::as_select())
            .find(version_id)
            .first::<PortfolioVersionDB>(&mut conn)
            .or_not_found("PortfolioVersion", version_id)?;
        Ok(version.into())
    }

    fn get_latest_version(&self, portfolio_id: &str) -> Result<Option<PortfolioVersion>> {
        let mut conn = get_connection(&self.pool)?;
        let version = portfolio_versions::table
            .select(PortfolioVersionDB::as_select())
            .filter(portfolio_versions::portfolio_id.eq(portfolio_id))
            .order(portfolio_versions::version_number.desc())
            .first::<PortfolioVersionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(version.map(PortfolioVersion::from))
    }

    fn list_versions(&self, portfolio_id: &str) -> Result<Vec<PortfolioVersion>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = portfolio_versions::table
            .select(PortfolioVersionDB::as_select())
            .filter(portfolio_versions::portfolio_id.eq(portfolio_id))
            .order(portfolio_versions::version_number.asc())
            .load::<PortfolioVersionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PortfolioVersion::from).collect())
    }

    fn get_version_with_positions(&self, version_id: &str) -> Result<VersionWithPositions> {
        let mut conn = get_connection(&self.pool)?;
        let version: PortfolioVersion = portfolio_versions::table
            .select(PortfolioVersionDB::as_select())
            .find(version_id)
            .first::<PortfolioVersionDB>(&mut conn)
            .or_not_found("PortfolioVersion", version_id)?
            .into();
        let mut grouped = Self::load_positions(&mut conn, &[version.id.clone()])?;
        let positions = grouped.remove(&version.id).unwrap_or_default();
        Ok(VersionWithPositions { version, positions })
    }

    fn list_versions_with_positions(
        &self,
        portfolio_id: &str,
    ) -> Result<Vec<VersionWithPositions>> {
        let versions = self.list_versions(portfolio_id)?;
        let ids: Vec<String> = versions.iter().map(|v| v.id.clone()).collect();
        let mut conn = get_connection(&self.pool)?;
        let mut grouped = Self::load_positions(&mut conn, &ids)?;
        Ok(versions
            .into_iter()
            .map(|version| {
                let positions = grouped.remove(&version.id).unwrap_or_default();
                VersionWithPositions { version, positions }
            })
            .collect())
    }
}
