//! Portfolios, their immutable versions, and the valuation engine.

pub mod allocation;
mod portfolio_model;
mod portfolio_requests;
mod portfolio_service;
mod portfolio_traits;
pub mod snapshot;
pub mod validation;
pub mod valuation;
pub mod versions;


pub use allocation::{AllocationMap, PortfolioAllocations};
pub use portfolio_model::*;
pub use portfolio_requests::*;
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
pub use snapshot::{
    CreateSnapshotRequest, PortfolioSnapshot, SnapshotRepositoryTrait, SnapshotService,
    SnapshotServiceTrait,
};
pub use validation::{PositionValidator, ValidatedPosition};
pub use valuation::{PriceMap, Valuation, ValuationService, ValuationServiceTrait, ValuedPosition};
pub use versions::{build_version, VersionDraft};
