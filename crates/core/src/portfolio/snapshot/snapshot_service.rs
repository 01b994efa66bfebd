use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use log::info;
use serde_json::Value;

use super::snapshot_recorder::record_snapshot;
use super::{CreateSnapshotRequest, PortfolioSnapshot, SnapshotRepositoryTrait, SnapshotServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::portfolio::valuation::{Valuation, ValuationServiceTrait};
use crate::portfolio::PortfolioRepositoryTrait;

pub struct SnapshotService {
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    valuation_service: Arc<dyn ValuationServiceTrait>,
    snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
}

impl SnapshotService {
    pub fn new(
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        valuation_service: Arc<dyn ValuationServiceTrait>,
        snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
    ) -> Self {
        Self {
            portfolio_repository,
            valuation_service,
            snapshot_repository,
        }
    }

    fn pick_currency(requested: Option<&str>, valuation: &Valuation) -> Result<String> {
        requested
            .map(str::to_string)
            .or_else(|| valuation.allocations.dominant_currency().map(str::to_string))
            .or_else(|| valuation.positions.first().map(|p| p.currency.clone()))
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!(
                    "A currency is required to snapshot version {}",
                    valuation.version_id
                ))
                .into()
            })
    }
}

#[async_trait]
impl SnapshotServiceTrait for SnapshotService {
    async fn create_snapshot(&self, request: CreateSnapshotRequest) -> Result<PortfolioSnapshot> {
        let version = self.portfolio_repository.get_version(&request.version_id)?;
        let as_of: DateTime<Utc> = request
            .snapshot_date
            .and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN))
            .and_utc();

        let valuation = self
            .valuation_service
            .valuate_version(&version.id, as_of, request.basis)
            .await?;
        let currency = Self::pick_currency(request.currency.as_deref(), &valuation)?;

        let mut metadata = request.metadata.unwrap_or_default();
        metadata.insert("asOf".to_string(), Value::from(as_of.to_rfc3339()));
        metadata.insert(
            "versionNumber".to_string(),
            Value::from(version.version_number),
        );
        metadata.insert(
            "allocations".to_string(),
            serde_json::to_value(&valuation.allocations)?,
        );

        let snapshot = record_snapshot(
            &version,
            valuation.total_value,
            &currency,
            request.snapshot_date,
            Some(metadata),
        )?;
        let snapshot = self.snapshot_repository.insert_snapshot(snapshot).await?;
        info!(
            "Recorded snapshot {} of version {} for {}",
            snapshot.id, version.id, snapshot.snapshot_date
        );
        Ok(snapshot)
    }

    fn list_snapshots(&self, portfolio_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        self.portfolio_repository
            .get_by_id(portfolio_id)?
            .ensure_active()?;
        self.snapshot_repository.list_by_portfolio(portfolio_id)
    }

    fn get_snapshot(&self, snapshot_id: &str) -> Result<PortfolioSnapshot> {
        let snapshot = self.snapshot_repository.get_by_id(snapshot_id)?;
        self.portfolio_repository
            .get_by_id(&snapshot.portfolio_id)?
            .ensure_active()?;
        Ok(snapshot)
    }
}
