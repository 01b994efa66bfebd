use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::valuation_calculator::calculate_valuation;
use super::valuation_model::{PriceMap, Valuation};
use crate::assets::{Asset, AssetRegistryTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::portfolio::snapshot::SnapshotRepositoryTrait;
use crate::portfolio::{
    PortfolioRepositoryTrait, PositionSizing, ResolvedPosition, VersionWithPositions,
};
use crate::quotes::PriceSourceTrait;

#[async_trait]
pub trait ValuationServiceTrait: Send + Sync {
    /// Values an already loaded version with prices taken at `as_of`.
    async fn valuate(
        &self,
        version: &VersionWithPositions,
        as_of: DateTime<Utc>,
        basis: Option<Decimal>,
    ) -> Result<Valuation>;

    /// Loads and values a version of an active portfolio.
    async fn valuate_version(
        &self,
        version_id: &str,
        as_of: DateTime<Utc>,
        basis: Option<Decimal>,
    ) -> Result<Valuation>;

    /// Values a version using a stored snapshot's total value as the basis.
    async fn valuate_with_snapshot_basis(
        &self,
        version_id: &str,
        snapshot_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Valuation>;
}

pub struct ValuationService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    asset_registry: Arc<dyn AssetRegistryTrait>,
    price_source: Arc<dyn PriceSourceTrait>,
    snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
}

impl ValuationService {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        asset_registry: Arc<dyn AssetRegistryTrait>,
        price_source: Arc<dyn PriceSourceTrait>,
        snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
    ) -> Self {
        Self {
            portfolio_repository,
            asset_registry,
            price_source,
            snapshot_repository,
        }
    }

    fn resolve_positions(&self, version: &VersionWithPositions) -> Result<Vec<ResolvedPosition>> {
        let asset_ids: Vec<String> = version
            .positions
            .iter()
            .map(|p| p.asset_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let assets: HashMap<String, Asset> = self
            .asset_registry
            .list_assets_by_ids(&asset_ids)?
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();

        version
            .positions
            .iter()
            .map(|position| {
                let asset = assets
                    .get(&position.asset_id)
                    .cloned()
                    .ok_or_else(|| Error::not_found("Asset", position.asset_id.clone()))?;
                Ok(ResolvedPosition {
                    position: position.clone(),
                    asset,
                })
            })
            .collect()
    }

    /// Fetches one price per distinct asset of the quantity-based positions, concurrently.
    async fn fetch_prices(
        &self,
        positions: &[ResolvedPosition],
        as_of: DateTime<Utc>,
    ) -> Result<PriceMap> {
        let asset_ids: BTreeSet<&str> = positions
            .iter()
            .filter(|p| matches!(p.position.sizing, PositionSizing::Quantity { .. }))
            .map(|p| p.asset.id.as_str())
            .collect();

        let prices = try_join_all(
            asset_ids
                .into_iter()
                .map(|asset_id| self.price_source.price_of(asset_id, as_of)),
        )
        .await?;

        Ok(prices
            .into_iter()
            .map(|price| (price.asset_id.clone(), price))
            .collect())
    }

    fn load_active_version(&self, version_id: &str) -> Result<VersionWithPositions> {
        let version = self.portfolio_repository.get_version_with_positions(version_id)?;
        self.portfolio_repository
            .get_by_id(&version.version.portfolio_id)?
            .ensure_active()?;
        Ok(version)
    }
}

#[async_trait]
impl ValuationServiceTrait for ValuationService {
    async fn valuate(
        &self,
        version: &VersionWithPositions,
        as_of: DateTime<Utc>,
        basis: Option<Decimal>,
    ) -> Result<Valuation> {
        let start = Instant::now();
        let positions = self.resolve_positions(version)?;
        let prices = self.fetch_prices(&positions, as_of).await?;

        let valuation = calculate_valuation(&version.version.id, &positions, &prices, basis, as_of)
            .inspect_err(|e| {
                warn!("Valuation of version {} failed: {}", version.version.id, e);
            })?;

        debug!(
            "Valued version {} at {} with {} prices in {:?}",
            version.version.id,
            valuation.total_value,
            prices.len(),
            start.elapsed()
        );
        Ok(valuation)
    }

    async fn valuate_version(
        &self,
        version_id: &str,
        as_of: DateTime<Utc>,
        basis: Option<Decimal>,
    ) -> Result<Valuation> {
        let version = self.load_active_version(version_id)?;
        self.valuate(&version, as_of, basis).await
    }

    async fn valuate_with_snapshot_basis(
        &self,
        version_id: &str,
        snapshot_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Valuation> {
        let version = self.load_active_version(version_id)?;
        let snapshot = self.snapshot_repository.get_by_id(snapshot_id)?;
        if snapshot.portfolio_id != version.version.portfolio_id {
            return Err(ValidationError::InvalidInput(format!(
                "Snapshot {} does not belong to portfolio {}",
                snapshot_id, version.version.portfolio_id
            ))
            .into());
        }
        self.valuate(&version, as_of, Some(snapshot.total_value))
            .await
    }
}
