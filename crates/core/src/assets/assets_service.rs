use log::{debug, info};
use std::sync::Arc;

use super::assets_model::{Asset, AssetKey, AssetType, NewAsset};
use super::assets_traits::{AssetRegistryTrait, AssetRepositoryTrait, AssetServiceTrait};
use crate::errors::{Error, Result, ValidationError};

/// What the registry does when a position references an instrument it does not know.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssetResolutionPolicy {
    /// Unknown and inactive instruments fail resolution.
    #[default]
    Strict,
    /// Unknown instruments are registered on the fly, denominated in `currency`.
    CreateMissing { currency: String },
}

/// Service for managing assets
pub struct AssetService {
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    policy: AssetResolutionPolicy,
}

impl AssetService {
    /// Creates a new AssetService instance
    pub fn new(
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        policy: AssetResolutionPolicy,
    ) -> Self {
        Self {
            asset_repository,
            policy,
        }
    }
}

#[async_trait::async_trait]
impl AssetServiceTrait for AssetService {
    /// Lists all assets
    fn get_assets(&self) -> Result<Vec<Asset>> {
        self.asset_repository.list()
    }

    /// Retrieves an asset by its ID
    fn get_asset_by_id(&self, asset_id: &str) -> Result<Asset> {
        self.asset_repository.get_by_id(asset_id)
    }

    async fn create_asset(&self, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;
        let new_asset = new_asset.normalized();
        let key = AssetKey::new(
            &new_asset.ticker,
            new_asset.exchange.as_deref(),
            new_asset.asset_type,
        );
        if let Some(existing) = self.asset_repository.find_by_key(&key)? {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Asset {} already exists with id {}",
                key, existing.id
            ))));
        }
        let asset = self.asset_repository.create(new_asset).await?;
        info!("Registered asset {} as {}", key, asset.id);
        Ok(asset)
    }

    async fn deactivate_asset(&self, asset_id: &str) -> Result<Asset> {
        self.asset_repository.set_active(asset_id, false).await
    }
}

#[async_trait::async_trait]
impl AssetRegistryTrait for AssetService {
    async fn resolve_asset(
        &self,
        ticker: &str,
        exchange: Option<&str>,
        asset_type: AssetType,
    ) -> Result<Asset> {
        let key = AssetKey::new(ticker, exchange, asset_type);
        match self.asset_repository.find_by_key(&key)? {
            Some(asset) if asset.is_active => Ok(asset),
            Some(asset) => {
                debug!("Asset {} ({}) is inactive", key, asset.id);
                Err(Error::not_found("Asset", key.to_string()))
            }
            None => match &self.policy {
                AssetResolutionPolicy::Strict => Err(Error::not_found("Asset", key.to_string())),
                AssetResolutionPolicy::CreateMissing { currency } => {
                    let new_asset = NewAsset::minimal(&key, currency);
                    new_asset.validate()?;
                    let asset = self.asset_repository.create(new_asset.normalized()).await?;
                    info!("Created asset {} on demand as {}", key, asset.id);
                    Ok(asset)
                }
            },
        }
    }

    fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        self.asset_repository.get_by_id(asset_id)
    }

    fn list_assets_by_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>> {
        self.asset_repository.list_by_ids(asset_ids)
    }
}
