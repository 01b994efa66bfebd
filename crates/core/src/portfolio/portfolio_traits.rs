use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use super::portfolio_model::{
    NewPortfolio, Portfolio, PortfolioDetail, PortfolioUpdate, PortfolioVersion,
    VersionWithPositions,
};
use super::portfolio_requests::{
    CreatePortfolioRequest, CreatePortfolioVersionRequest, PortfolioResponse,
    UpdatePortfolioRequest,
};
use super::versions::VersionDraft;
use crate::errors::Result;

/// Storage contract for portfolios, versions and positions.
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    /// Inserts the portfolio and its first version in one transaction and
    /// makes that version the base version.
    async fn create_portfolio(
        &self,
        new_portfolio: NewPortfolio,
        first_version: VersionDraft,
    ) -> Result<PortfolioDetail>;

    /// Applies `update` and, when given, numbers and inserts `new_version`.
    /// Both writes commit together or not at all.
    async fn update_portfolio(
        &self,
        update: PortfolioUpdate,
        new_version: Option<VersionDraft>,
    ) -> Result<(Portfolio, Option<VersionWithPositions>)>;

    async fn soft_delete(&self, portfolio_id: &str, at: NaiveDateTime) -> Result<Portfolio>;

    async fn set_base_version(&self, portfolio_id: &str, version_id: &str) -> Result<Portfolio>;

    /// Numbers and inserts a version. Reading the latest number and inserting
    /// the version happen atomically.
    async fn insert_version(&self, draft: VersionDraft) -> Result<VersionWithPositions>;

    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio>;

    /// Portfolios that are not deleted, optionally restricted to one owner.
    fn list(&self, user_id: Option<&str>) -> Result<Vec<Portfolio>>;

    /// Highest version number of the portfolio, 0 when it has none.
    fn latest_version_number(&self, portfolio_id: &str) -> Result<i32>;

    fn get_version(&self, version_id: &str) -> Result<PortfolioVersion>;

    fn get_latest_version(&self, portfolio_id: &str) -> Result<Option<PortfolioVersion>>;

    /// Versions of a portfolio in ascending number order.
    fn list_versions(&self, portfolio_id: &str) -> Result<Vec<PortfolioVersion>>;

    fn get_version_with_positions(&self, version_id: &str) -> Result<VersionWithPositions>;

    fn list_versions_with_positions(
        &self,
        portfolio_id: &str,
    ) -> Result<Vec<VersionWithPositions>>;
}

/// Portfolio operations exposed to callers.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    async fn create_portfolio(
        &self,
        request: CreatePortfolioRequest,
        user_id: Option<String>,
    ) -> Result<PortfolioDetail>;

    async fn update_portfolio(
        &self,
        portfolio_id: &str,
        request: UpdatePortfolioRequest,
        user_id: Option<String>,
    ) -> Result<PortfolioDetail>;

    async fn create_version(
        &self,
        portfolio_id: &str,
        request: CreatePortfolioVersionRequest,
        created_by: Option<String>,
    ) -> Result<VersionWithPositions>;

    fn get_portfolio(&self, portfolio_id: &str) -> Result<PortfolioDetail>;

    fn list_portfolios(&self, user_id: Option<&str>) -> Result<Vec<Portfolio>>;

    fn list_versions(&self, portfolio_id: &str) -> Result<Vec<PortfolioVersion>>;

    async fn delete_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;

    async fn set_base_version(&self, portfolio_id: &str, version_id: &str) -> Result<Portfolio>;

    /// Values a version (the latest when `version_id` is `None`) and summarizes it.
    async fn get_summary(
        &self,
        portfolio_id: &str,
        version_id: Option<&str>,
        as_of: DateTime<Utc>,
        basis: Option<Decimal>,
    ) -> Result<PortfolioResponse>;
}
