//! Assets module - domain models, services, and traits.

mod assets_model;
mod assets_service;
mod assets_traits;


// Re-export the public interface
pub use assets_model::{Asset, AssetKey, AssetType, NewAsset};
pub use assets_service::{AssetResolutionPolicy, AssetService};
pub use assets_traits::{AssetRegistryTrait, AssetRepositoryTrait, AssetServiceTrait};
