//! In-memory collaborators shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::assets::{Asset, AssetKey, AssetRepositoryTrait, AssetType, NewAsset};
use crate::errors::{Error, Result};
use crate::portfolio::snapshot::{PortfolioSnapshot, SnapshotRepositoryTrait};
use crate::portfolio::{
    NewPortfolio, Portfolio, PortfolioDetail, PortfolioRepositoryTrait, PortfolioState,
    PortfolioUpdate, PortfolioVersion, Position, PositionSizing, ResolvedPosition, VersionDraft,
    VersionWithPositions,
};
use crate::quotes::{NewQuote, Price, PriceSourceTrait, Quote, QuoteStoreTrait};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn sample_asset(
    id: &str,
    ticker: &str,
    exchange: Option<&str>,
    asset_type: AssetType,
    currency: &str,
    sector: Option<&str>,
) -> Asset {
    Asset {
        id: id.to_string(),
        ticker: ticker.to_string(),
        exchange: exchange.map(str::to_string),
        asset_type,
        name: ticker.to_string(),
        currency: currency.to_string(),
        sector: sector.map(str::to_string),
        country: None,
        isin: None,
        cusip: None,
        is_active: true,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn quantity(quantity: Decimal) -> PositionSizing {
    PositionSizing::Quantity {
        quantity,
        average_price: None,
    }
}

pub fn weight(weight: Decimal) -> PositionSizing {
    PositionSizing::Weight { weight }
}

pub fn resolved(asset: &Asset, sizing: PositionSizing) -> ResolvedPosition {
    ResolvedPosition {
        position: Position {
            id: Uuid::new_v4().to_string(),
            portfolio_version_id: "v1".to_string(),
            asset_id: asset.id.clone(),
            sizing,
            market_value: None,
            created_at: now(),
            updated_at: now(),
        },
        asset: asset.clone(),
    }
}

// ============== Assets ==============

pub struct MockAssetRepository {
    assets: Mutex<Vec<Asset>>,
}

impl MockAssetRepository {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets: Mutex::new(assets),
        }
    }
}

#[async_trait]
impl AssetRepositoryTrait for MockAssetRepository {
    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        let asset = Asset {
            id: new_asset
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_asset.name.unwrap_or_else(|| new_asset.ticker.clone()),
            ticker: new_asset.ticker,
            exchange: new_asset.exchange,
            asset_type: new_asset.asset_type,
            currency: new_asset.currency,
            sector: new_asset.sector,
            country: new_asset.country,
            isin: new_asset.isin,
            cusip: new_asset.cusip,
            is_active: new_asset.is_active,
            created_at: now(),
            updated_at: now(),
        };
        self.assets.lock().unwrap().push(asset.clone());
        Ok(asset)
    }

    async fn set_active(&self, asset_id: &str, is_active: bool) -> Result<Asset> {
        let mut assets = self.assets.lock().unwrap();
        let asset = assets
            .iter_mut()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| Error::not_found("Asset", asset_id))?;
        asset.is_active = is_active;
        Ok(asset.clone())
    }

    fn get_by_id(&self, asset_id: &str) -> Result<Asset> {
        self.assets
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == asset_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Asset", asset_id))
    }

    fn find_by_key(&self, key: &AssetKey) -> Result<Option<Asset>> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.key() == key)
            .cloned())
    }

    fn list(&self) -> Result<Vec<Asset>> {
        Ok(self.assets.lock().unwrap().clone())
    }

    fn list_by_ids(&self, asset_ids: &[String]) -> Result<Vec<Asset>> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| asset_ids.contains(&a.id))
            .cloned()
            .collect())
    }
}

// ============== Prices ==============

#[derive(Default)]
pub struct MockQuoteStore {
    quotes: Mutex<Vec<Quote>>,
}

#[async_trait]
impl QuoteStoreTrait for MockQuoteStore {
    async fn save_quote(&self, quote: NewQuote) -> Result<Quote> {
        let quote = Quote {
            id: Uuid::new_v4().to_string(),
            asset_id: quote.asset_id,
            price: quote.price,
            currency: quote.currency,
            quoted_at: quote.quoted_at,
            created_at: Utc::now(),
        };
        self.quotes.lock().unwrap().push(quote.clone());
        Ok(quote)
    }

    fn latest_quote_before(&self, asset_id: &str, as_of: DateTime<Utc>) -> Result<Option<Quote>> {
        Ok(self
            .quotes
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.asset_id == asset_id && q.quoted_at <= as_of)
            .max_by_key(|q| q.quoted_at)
            .cloned())
    }
}

/// Fixed prices, optionally answered after a delay. Counts lookups.
#[derive(Default)]
pub struct StaticPriceSource {
    prices: HashMap<String, (Decimal, String)>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticPriceSource {
    pub fn new(prices: &[(&str, Decimal, &str)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(id, price, currency)| (id.to_string(), (*price, currency.to_string())))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSourceTrait for StaticPriceSource {
    async fn price_of(&self, asset_id: &str, as_of: DateTime<Utc>) -> Result<Price> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let (price, currency) = self
            .prices
            .get(asset_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Price", asset_id))?;
        Ok(Price {
            asset_id: asset_id.to_string(),
            price,
            currency,
            as_of,
        })
    }
}

// ============== Portfolios ==============

#[derive(Default)]
struct PortfolioTables {
    portfolios: Vec<Portfolio>,
    versions: Vec<VersionWithPositions>,
}

#[derive(Default)]
pub struct MockPortfolioRepository {
    tables: Mutex<PortfolioTables>,
    reject_versions: AtomicBool,
}

impl MockPortfolioRepository {
    /// Makes every later version write fail.
    pub fn reject_version_writes(&self) {
        self.reject_versions.store(true, Ordering::SeqCst);
    }

    fn number_after(tables: &PortfolioTables, portfolio_id: &str) -> i32 {
        tables
            .versions
            .iter()
            .filter(|v| v.version.portfolio_id == portfolio_id)
            .map(|v| v.version.version_number)
            .max()
            .unwrap_or(0)
    }

    fn with_portfolio<T>(
        &self,
        portfolio_id: &str,
        f: impl FnOnce(&mut Portfolio) -> T,
    ) -> Result<T> {
        let mut tables = self.tables.lock().unwrap();
        let portfolio = tables
            .portfolios
            .iter_mut()
            .find(|p| p.id == portfolio_id)
            .ok_or_else(|| Error::not_found("Portfolio", portfolio_id))?;
        Ok(f(portfolio))
    }
}

#[async_trait]
impl PortfolioRepositoryTrait for MockPortfolioRepository {
    async fn create_portfolio(
        &self,
        new_portfolio: NewPortfolio,
        first_version: VersionDraft,
    ) -> Result<PortfolioDetail> {
        let id = first_version.portfolio_id.clone();
        let version = first_version.into_version(0);
        let portfolio = Portfolio {
            id,
            name: new_portfolio.name,
            description: new_portfolio.description,
            user_id: new_portfolio.user_id,
            base_version_id: Some(version.version.id.clone()),
            is_active: true,
            state: PortfolioState::Active,
            created_at: now(),
            updated_at: now(),
        };
        let mut tables = self.tables.lock().unwrap();
        tables.portfolios.push(portfolio.clone());
        tables.versions.push(version.clone());
        Ok(PortfolioDetail {
            portfolio,
            versions: vec![version],
        })
    }

    async fn update_portfolio(
        &self,
        update: PortfolioUpdate,
        new_version: Option<VersionDraft>,
    ) -> Result<(Portfolio, Option<VersionWithPositions>)> {
        let mut tables = self.tables.lock().unwrap();
        let index = tables
            .portfolios
            .iter()
            .position(|p| p.id == update.id && p.state == PortfolioState::Active)
            .ok_or_else(|| Error::not_found("Portfolio", &update.id))?;
        // Nothing is applied when the version cannot be stored
        if new_version.is_some() && self.reject_versions.load(Ordering::SeqCst) {
            return Err(Error::Unexpected("version insert rejected".to_string()));
        }

        let version = new_version.map(|draft| {
            let latest = Self::number_after(&tables, &update.id);
            draft.into_version(latest)
        });
        if let Some(version) = &version {
            tables.versions.push(version.clone());
        }
        let portfolio = &mut tables.portfolios[index];
        if let Some(name) = update.name {
            portfolio.name = name;
        }
        if let Some(description) = update.description {
            portfolio.description = Some(description);
        }
        portfolio.updated_at = now();
        Ok((portfolio.clone(), version))
    }

    async fn soft_delete(&self, portfolio_id: &str, at: NaiveDateTime) -> Result<Portfolio> {
        self.with_portfolio(portfolio_id, |p| {
            p.state = PortfolioState::Deleted { at };
            p.is_active = false;
            p.clone()
        })
    }

    async fn set_base_version(&self, portfolio_id: &str, version_id: &str) -> Result<Portfolio> {
        self.with_portfolio(portfolio_id, |p| {
            p.base_version_id = Some(version_id.to_string());
            p.clone()
        })
    }

    async fn insert_version(&self, draft: VersionDraft) -> Result<VersionWithPositions> {
        tokio::task::yield_now().await;
        let mut tables = self.tables.lock().unwrap();
        if !tables.portfolios.iter().any(|p| p.id == draft.portfolio_id) {
            return Err(Error::not_found("Portfolio", draft.portfolio_id));
        }
        let latest = Self::number_after(&tables, &draft.portfolio_id);
        let version = draft.into_version(latest);
        tables.versions.push(version.clone());
        Ok(version)
    }

    fn get_by_id(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.with_portfolio(portfolio_id, |p| p.clone())
    }

    fn list(&self, user_id: Option<&str>) -> Result<Vec<Portfolio>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .portfolios
            .iter()
            .filter(|p| p.state == PortfolioState::Active)
            .filter(|p| user_id.is_none() || p.user_id.as_deref() == user_id)
            .cloned()
            .collect())
    }

    fn latest_version_number(&self, portfolio_id: &str) -> Result<i32> {
        Ok(Self::number_after(&self.tables.lock().unwrap(), portfolio_id))
    }

    fn get_version(&self, version_id: &str) -> Result<PortfolioVersion> {
        Ok(self.get_version_with_positions(version_id)?.version)
    }

    fn get_latest_version(&self, portfolio_id: &str) -> Result<Option<PortfolioVersion>> {
        Ok(self.list_versions(portfolio_id)?.pop())
    }

    fn list_versions(&self, portfolio_id: &str) -> Result<Vec<PortfolioVersion>> {
        Ok(self
            .list_versions_with_positions(portfolio_id)?
            .into_iter()
            .map(|v| v.version)
            .collect())
    }

    fn get_version_with_positions(&self, version_id: &str) -> Result<VersionWithPositions> {
        self.tables
            .lock()
            .unwrap()
            .versions
            .iter()
            .find(|v| v.version.id == version_id)
            .cloned()
            .ok_or_else(|| Error::not_found("PortfolioVersion", version_id))
    }

    fn list_versions_with_positions(
        &self,
        portfolio_id: &str,
    ) -> Result<Vec<VersionWithPositions>> {
        let mut versions: Vec<VersionWithPositions> = self
            .tables
            .lock()
            .unwrap()
            .versions
            .iter()
            .filter(|v| v.version.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.version.version_number);
        Ok(versions)
    }
}

// ============== Snapshots ==============

#[derive(Default)]
pub struct MockSnapshotRepository {
    snapshots: Mutex<Vec<PortfolioSnapshot>>,
}

#[async_trait]
impl SnapshotRepositoryTrait for MockSnapshotRepository {
    async fn insert_snapshot(&self, snapshot: PortfolioSnapshot) -> Result<PortfolioSnapshot> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(snapshot)
    }

    fn get_by_id(&self, snapshot_id: &str) -> Result<PortfolioSnapshot> {
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == snapshot_id)
            .cloned()
            .ok_or_else(|| Error::not_found("PortfolioSnapshot", snapshot_id))
    }

    fn list_by_portfolio(&self, portfolio_id: &str) -> Result<Vec<PortfolioSnapshot>> {
        let mut snapshots: Vec<PortfolioSnapshot> = self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.portfolio_id == portfolio_id)
            .cloned()
            .collect();
        snapshots.sort_by(|a, b| b.snapshot_date.cmp(&a.snapshot_date));
        Ok(snapshots)
    }

    fn latest_for_version(&self, version_id: &str) -> Result<Option<PortfolioSnapshot>> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.portfolio_version_id == version_id)
            .max_by_key(|s| s.snapshot_date)
            .cloned())
    }
}
