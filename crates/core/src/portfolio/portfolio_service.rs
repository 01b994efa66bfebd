use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::portfolio_model::{
    NewPortfolio, Portfolio, PortfolioDetail, PortfolioUpdate, PortfolioVersion,
    VersionWithPositions,
};
use super::portfolio_requests::{
    CreatePortfolioRequest, CreatePortfolioVersionRequest, PortfolioResponse,
    UpdatePortfolioRequest,
};
use super::portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use super::validation::{validate_portfolio_name, PositionValidator};
use super::valuation::ValuationServiceTrait;
use super::versions::VersionDraft;
use crate::assets::AssetRegistryTrait;
use crate::errors::{Error, Result};

/// Service for managing portfolios and their versions.
pub struct PortfolioService {
    repository: Arc<dyn PortfolioRepositoryTrait>,
    validator: PositionValidator,
    valuation_service: Arc<dyn ValuationServiceTrait>,
}

impl PortfolioService {
    pub fn new(
        repository: Arc<dyn PortfolioRepositoryTrait>,
        asset_registry: Arc<dyn AssetRegistryTrait>,
        valuation_service: Arc<dyn ValuationServiceTrait>,
    ) -> Self {
        Self {
            repository,
            validator: PositionValidator::new(asset_registry),
            valuation_service,
        }
    }

    fn active_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.repository.get_by_id(portfolio_id)?.ensure_active()
    }

    fn load_detail(&self, portfolio: Portfolio) -> Result<PortfolioDetail> {
        let versions = self.repository.list_versions_with_positions(&portfolio.id)?;
        Ok(PortfolioDetail {
            portfolio,
            versions,
        })
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn create_portfolio(
        &self,
        request: CreatePortfolioRequest,
        user_id: Option<String>,
    ) -> Result<PortfolioDetail> {
        let name = validate_portfolio_name(&request.name)?;
        let positions = self.validator.validate_positions(&request.positions).await?;

        let portfolio_id = Uuid::new_v4().to_string();
        let draft = VersionDraft::new(&portfolio_id, positions, None, user_id.clone())?;
        let new_portfolio = NewPortfolio {
            id: Some(portfolio_id),
            name,
            description: request.description,
            user_id,
        };

        let detail = self.repository.create_portfolio(new_portfolio, draft).await?;
        info!(
            "Created portfolio {} with {} positions",
            detail.portfolio.id,
            detail
                .latest_version()
                .map(|v| v.positions.len())
                .unwrap_or_default()
        );
        Ok(detail)
    }

    async fn update_portfolio(
        &self,
        portfolio_id: &str,
        request: UpdatePortfolioRequest,
        user_id: Option<String>,
    ) -> Result<PortfolioDetail> {
        self.active_portfolio(portfolio_id)?;
        let name = request
            .name
            .as_deref()
            .map(validate_portfolio_name)
            .transpose()?;

        // Positions are validated before any write
        let draft = match &request.positions {
            Some(positions) => {
                let validated = self.validator.validate_positions(positions).await?;
                Some(VersionDraft::new(portfolio_id, validated, None, user_id)?)
            }
            None => None,
        };

        if name.is_some() || request.description.is_some() || draft.is_some() {
            let (_, version) = self
                .repository
                .update_portfolio(
                    PortfolioUpdate {
                        id: portfolio_id.to_string(),
                        name,
                        description: request.description,
                    },
                    draft,
                )
                .await?;
            if let Some(version) = version {
                debug!(
                    "Portfolio {} updated to version {}",
                    portfolio_id, version.version.version_number
                );
            }
        }

        let portfolio = self.active_portfolio(portfolio_id)?;
        self.load_detail(portfolio)
    }

    async fn create_version(
        &self,
        portfolio_id: &str,
        request: CreatePortfolioVersionRequest,
        created_by: Option<String>,
    ) -> Result<VersionWithPositions> {
        self.active_portfolio(portfolio_id)?;
        let positions = self.validator.validate_positions(&request.positions).await?;
        let draft = VersionDraft::new(portfolio_id, positions, request.description, created_by)?;

        let version = self.repository.insert_version(draft).await?;
        info!(
            "Created version {} ({}) of portfolio {}",
            version.version.version_number, version.version.id, portfolio_id
        );
        Ok(version)
    }

    fn get_portfolio(&self, portfolio_id: &str) -> Result<PortfolioDetail> {
        let portfolio = self.active_portfolio(portfolio_id)?;
        self.load_detail(portfolio)
    }

    fn list_portfolios(&self, user_id: Option<&str>) -> Result<Vec<Portfolio>> {
        Ok(self
            .repository
            .list(user_id)?
            .into_iter()
            .filter(|p| p.state.deleted_at().is_none())
            .collect())
    }

    fn list_versions(&self, portfolio_id: &str) -> Result<Vec<PortfolioVersion>> {
        self.active_portfolio(portfolio_id)?;
        self.repository.list_versions(portfolio_id)
    }

    async fn delete_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.active_portfolio(portfolio_id)?;
        let portfolio = self
            .repository
            .soft_delete(portfolio_id, Utc::now().naive_utc())
            .await?;
        info!("Deleted portfolio {}", portfolio_id);
        Ok(portfolio)
    }

    async fn set_base_version(&self, portfolio_id: &str, version_id: &str) -> Result<Portfolio> {
        self.active_portfolio(portfolio_id)?;
        let version = self.repository.get_version(version_id)?;
        if version.portfolio_id != portfolio_id {
            return Err(Error::not_found("PortfolioVersion", version_id));
        }
        self.repository
            .set_base_version(portfolio_id, version_id)
            .await
    }

    async fn get_summary(
        &self,
        portfolio_id: &str,
        version_id: Option<&str>,
        as_of: DateTime<Utc>,
        basis: Option<Decimal>,
    ) -> Result<PortfolioResponse> {
        let portfolio = self.active_portfolio(portfolio_id)?;
        let version = match version_id {
            Some(id) => {
                let version = self.repository.get_version_with_positions(id)?;
                if version.version.portfolio_id != portfolio_id {
                    return Err(Error::not_found("PortfolioVersion", id));
                }
                version
            }
            None => {
                let latest = self
                    .repository
                    .get_latest_version(portfolio_id)?
                    .ok_or_else(|| Error::not_found("PortfolioVersion", portfolio_id))?;
                self.repository.get_version_with_positions(&latest.id)?
            }
        };

        let valuation = self.valuation_service.valuate(&version, as_of, basis).await?;

        Ok(PortfolioResponse {
            portfolio,
            version_id: version.version.id,
            version_number: version.version.version_number,
            total_value: valuation.total_value,
            total_positions: version.positions.len(),
            asset_allocation: valuation.allocations.asset_types,
            sector_allocation: valuation.allocations.sectors,
            currency_allocation: valuation.allocations.currencies,
        })
    }
}
