use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};
use riskops_core::{
    assets::{AssetService, AssetServiceTrait},
    portfolio::{
        PortfolioService, PortfolioServiceTrait, SnapshotService, SnapshotServiceTrait,
        ValuationService, ValuationServiceTrait,
    },
    quotes::{QuotePriceSource, QuoteStoreTrait},
};
use riskops_storage_sqlite::{
    db::{self, PoolOptions},
    AssetRepository, DbPool, PortfolioRepository, QuoteRepository, SnapshotRepository,
};

pub struct AppState {
    pub pool: Arc<DbPool>,
    pub asset_service: Arc<dyn AssetServiceTrait + Send + Sync>,
    pub quote_store: Arc<dyn QuoteStoreTrait + Send + Sync>,
    pub portfolio_service: Arc<dyn PortfolioServiceTrait + Send + Sync>,
    pub valuation_service: Arc<dyn ValuationServiceTrait + Send + Sync>,
    pub snapshot_service: Arc<dyn SnapshotServiceTrait + Send + Sync>,
    pub db_path: String,
}

pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path, PoolOptions::default())?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let asset_repository = Arc::new(AssetRepository::new(pool.clone(), writer.clone()));
    let portfolio_repository = Arc::new(PortfolioRepository::new(pool.clone(), writer.clone()));
    let snapshot_repository = Arc::new(SnapshotRepository::new(pool.clone(), writer.clone()));
    let quote_repository = Arc::new(QuoteRepository::new(pool.clone(), writer.clone()));

    let asset_service = Arc::new(AssetService::new(
        asset_repository,
        config.asset_policy.clone(),
    ));
    let price_source = Arc::new(QuotePriceSource::new(
        quote_repository.clone(),
        config.price_max_age,
    ));

    let valuation_service = Arc::new(ValuationService::new(
        portfolio_repository.clone(),
        asset_service.clone(),
        price_source,
        snapshot_repository.clone(),
    ));
    let portfolio_service = Arc::new(PortfolioService::new(
        portfolio_repository.clone(),
        asset_service.clone(),
        valuation_service.clone(),
    ));
    let snapshot_service = Arc::new(SnapshotService::new(
        portfolio_repository,
        valuation_service.clone(),
        snapshot_repository,
    ));

    Ok(Arc::new(AppState {
        pool,
        asset_service,
        quote_store: quote_repository,
        portfolio_service,
        valuation_service,
        snapshot_service,
        db_path,
    }))
}
