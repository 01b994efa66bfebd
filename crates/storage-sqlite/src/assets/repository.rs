use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use riskops_core::assets::{Asset, AssetKey, AssetRepositoryTrait, NewAsset};
use riskops_core::Result;

use super::model::{into_assets, AssetDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{OrNotFound, StorageError};
use crate::schema::assets;
use crate::utils::chunk_for_sqlite;

/// Repository for the asset registry
pub struct AssetRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AssetRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;
        let asset_db: AssetDB = new_asset.normalized().into();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let result_db = diesel::insert_into(assets::table)
                    .values(&asset_db)
                    .get_result::<AssetDB>(conn)
                    .map_err(StorageError::from)?;
                Ok(Asset::try_from(result_db)?)
            })
            .await
    }

    async fn set_active(&self, asset_id: &str, is_active: bool) -> Result<Asset> {
        let asset_id = asset_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let result_db = diesel::update(assets::table.find(&asset_id))
                    .set((
                        assets::is_active.eq(is_active),
                        assets::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .get_result::<AssetDB>(conn)
                    .or_not_found("Asset", &asset_id)?;
                Ok(Asset::try_from(result_db)?)
            })
            .await
    }

    fn get_by_id(&self, asset_id: &str) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;
        let result = assets::table
            .select(AssetDB::as_select())
            .find(asset_id)
            .first::<AssetDB>(&mut conn)
            .or_not_found("Asset", asset_id)?;
        Ok(Asset::try_from(result)?)
    }

    fn find_by_key(&self, key: &AssetKey) -> Result<Option<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = assets::table
            .select(AssetDB::as_select())
            .filter(assets::ticker.eq(&key.ticker))
            .filter(assets::asset_type.eq(key.asset_type.as_str()))
            .into_boxed();
        query = match &key.exchange {
            Some(exchange) => query.filter(assets::exchange.eq(exchange)),
            None => query.filter(assets::exchange.is_null()),
        };
        let result = query
            .first::<AssetDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(result.map(Asset::try_from).transpose()?)
    }

    fn list(&self) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let results = assets::table
            .select(AssetDB::as_select())
            .order((assets::ticker.asc(), assets::asset_type.asc()))
            .load::<AssetDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(into_assets(results)?)
    }

    fn list_by_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let mut results = Vec::with_capacity(asset_ids.len());
        for chunk in chunk_for_sqlite(asset_ids) {
            let rows = assets::table
                .select(AssetDB::as_select())
                .filter(assets::id.eq_any(chunk))
                .load::<AssetDB>(&mut conn)
                .map_err(StorageError::from)?;
            results.extend(into_assets(rows)?);
        }
        Ok(results)
    }
}
