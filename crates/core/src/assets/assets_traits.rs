use super::assets_model::{Asset, AssetKey, AssetType, NewAsset};
use crate::errors::Result;

/// Trait defining the contract for Asset service operations.
#[async_trait::async_trait]
pub trait AssetServiceTrait: Send + Sync {
    fn get_assets(&self) -> Result<Vec<Asset>>;
    fn get_asset_by_id(&self, asset_id: &str) -> Result<Asset>;
    async fn create_asset(&self, new_asset: NewAsset) -> Result<Asset>;
    /// Clears the active flag. Assets are never deleted.
    async fn deactivate_asset(&self, asset_id: &str) -> Result<Asset>;
}

/// Read side of the asset reference data, as consumed by validation and valuation.
#[async_trait::async_trait]
pub trait AssetRegistryTrait: Send + Sync {
    /// Resolves an instrument by its identity. Fails with `NotFound` when the
    /// registry does not know it.
    async fn resolve_asset(
        &self,
        ticker: &str,
        exchange: Option<&str>,
        asset_type: AssetType,
    ) -> Result<Asset>;

    fn get_asset(&self, asset_id: &str) -> Result<Asset>;

    fn list_assets_by_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>>;
}

/// Trait defining the contract for Asset repository operations.
#[async_trait::async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    async fn create(&self, new_asset: NewAsset) -> Result<Asset>;
    async fn set_active(&self, asset_id: &str, is_active: bool) -> Result<Asset>;
    fn get_by_id(&self, asset_id: &str) -> Result<Asset>;
    fn find_by_key(&self, key: &AssetKey) -> Result<Option<Asset>>;
    fn list(&self) -> Result<Vec<Asset>>;
    fn list_by_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>>;
}
