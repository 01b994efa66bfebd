//! Repository and service traits for portfolio snapshots.

use async_trait::async_trait;

use super::{CreateSnapshotRequest, PortfolioSnapshot};
use crate::errors::Result;

/// Repository trait for persisting portfolio snapshots.
#[async_trait]
pub trait SnapshotRepositoryTrait: Send + Sync {
    async fn insert_snapshot(&self, snapshot: PortfolioSnapshot) -> Result<PortfolioSnapshot>;

    fn get_by_id(&self, snapshot_id: &str) -> Result<PortfolioSnapshot>;

    /// Snapshots of a portfolio, newest snapshot date first.
    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<PortfolioSnapshot>>;

    /// The snapshot with the latest snapshot date for a version, if any.
    fn latest_for_version(&self, version_id: &str) -> Result<Option<PortfolioSnapshot>>;
}

#[async_trait]
pub trait SnapshotServiceTrait: Send + Sync {
    /// Values the version as of the end of the snapshot date (UTC) and stores the result.
    async fn create_snapshot(&self, request: CreateSnapshotRequest) -> Result<PortfolioSnapshot>;

    fn list_snapshots(&self, portfolio_id: &str) -> Result<Vec<PortfolioSnapshot>>;

    fn get_snapshot(&self, snapshot_id: &str) -> Result<PortfolioSnapshot>;
}
