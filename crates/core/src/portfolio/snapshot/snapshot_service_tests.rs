use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use serde_json::{Map, Value};

use super::*;
use crate::assets::{Asset, AssetResolutionPolicy, AssetService, AssetType};
use crate::errors::ErrorKind;
use crate::portfolio::valuation::ValuationService;
use crate::portfolio::{
    NewPortfolio, PortfolioDetail, PortfolioRepositoryTrait, PositionSizing, ValidatedPosition,
    VersionDraft,
};
use crate::test_support::{
    quantity, sample_asset, weight, MockAssetRepository, MockPortfolioRepository,
    MockSnapshotRepository, StaticPriceSource,
};

fn assets() -> Vec<Asset> {
    vec![
        sample_asset("aapl", "AAPL", None, AssetType::Stock, "USD", Some("Technology")),
        sample_asset("sap", "SAP", Some("XETR"), AssetType::Stock, "EUR", Some("Technology")),
        sample_asset("bnd", "BND", None, AssetType::Etf, "USD", None),
    ]
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
}

struct Fixture {
    portfolios: Arc<MockPortfolioRepository>,
    service: SnapshotService,
}

fn fixture() -> Fixture {
    let portfolios = Arc::new(MockPortfolioRepository::default());
    let snapshots = Arc::new(MockSnapshotRepository::default());
    let registry = Arc::new(AssetService::new(
        Arc::new(MockAssetRepository::new(assets())),
        AssetResolutionPolicy::Strict,
    ));
    let prices = Arc::new(StaticPriceSource::new(&[
        ("aapl", dec!(100), "USD"),
        ("sap", dec!(50), "EUR"),
    ]));
    let valuation = Arc::new(ValuationService::new(
        portfolios.clone(),
        registry,
        prices,
        snapshots.clone(),
    ));
    Fixture {
        service: SnapshotService::new(portfolios.clone(), valuation, snapshots),
        portfolios,
    }
}

async fn seed(repo: &MockPortfolioRepository, sizings: &[(&str, PositionSizing)]) -> PortfolioDetail {
    let assets = assets();
    let positions = sizings
        .iter()
        .map(|(id, sizing)| ValidatedPosition {
            asset: assets.iter().find(|a| a.id == *id).cloned().unwrap(),
            sizing: *sizing,
        })
        .collect();
    repo.create_portfolio(
        NewPortfolio {
            id: Some("p1".to_string()),
            name: "Snapshots".to_string(),
            description: None,
            user_id: None,
        },
        VersionDraft::new("p1", positions, None, None).unwrap(),
    )
    .await
    .unwrap()
}

fn request(version_id: &str) -> CreateSnapshotRequest {
    CreateSnapshotRequest {
        version_id: version_id.to_string(),
        snapshot_date: date(),
        currency: None,
        basis: None,
        metadata: None,
    }
}

#[tokio::test]
async fn records_valuation_with_dominant_currency() {
    let f = fixture();
    let detail = seed(
        &f.portfolios,
        &[("aapl", quantity(dec!(3))), ("sap", quantity(dec!(2)))],
    )
    .await;
    let version = &detail.versions[0].version;

    let snapshot = f.service.create_snapshot(request(&version.id)).await.unwrap();

    assert_eq!(snapshot.total_value, dec!(400));
    assert_eq!(snapshot.currency, "USD");
    assert_eq!(snapshot.portfolio_id, "p1");
    assert_eq!(snapshot.portfolio_version_id, version.id);
    assert_eq!(snapshot.snapshot_date, date());
    assert_eq!(snapshot.metadata["versionNumber"], 1);
    assert!(snapshot.metadata["allocations"]["currencies"]
        .get("EUR")
        .is_some());
}

#[tokio::test]
async fn explicit_currency_and_metadata_are_kept() {
    let f = fixture();
    let detail = seed(&f.portfolios, &[("bnd", weight(dec!(100)))]).await;
    let mut metadata = Map::new();
    metadata.insert("note".to_string(), Value::from("quarter end"));

    let snapshot = f
        .service
        .create_snapshot(CreateSnapshotRequest {
            currency: Some("chf".to_string()),
            basis: Some(dec!(2500)),
            metadata: Some(metadata),
            ..request(&detail.versions[0].version.id)
        })
        .await
        .unwrap();

    assert_eq!(snapshot.total_value, dec!(2500));
    assert_eq!(snapshot.currency, "CHF");
    assert_eq!(snapshot.metadata["note"], "quarter end");
}

#[tokio::test]
async fn weight_only_version_without_basis_fails() {
    let f = fixture();
    let detail = seed(&f.portfolios, &[("bnd", weight(dec!(100)))]).await;

    let err = f
        .service
        .create_snapshot(request(&detail.versions[0].version.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingBasisValue);
    assert!(f.service.list_snapshots("p1").unwrap().is_empty());
}

#[tokio::test]
async fn snapshots_are_listed_and_fetched() {
    let f = fixture();
    let detail = seed(&f.portfolios, &[("aapl", quantity(dec!(1)))]).await;
    let version_id = detail.versions[0].version.id.clone();

    let first = f.service.create_snapshot(request(&version_id)).await.unwrap();
    let second = f
        .service
        .create_snapshot(CreateSnapshotRequest {
            snapshot_date: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
            ..request(&version_id)
        })
        .await
        .unwrap();

    let listed = f.service.list_snapshots("p1").unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(f.service.get_snapshot(&first.id).unwrap(), first);
}

#[tokio::test]
async fn deleted_portfolio_cannot_be_snapshotted() {
    let f = fixture();
    let detail = seed(&f.portfolios, &[("aapl", quantity(dec!(1)))]).await;
    f.portfolios
        .soft_delete("p1", Utc::now().naive_utc())
        .await
        .unwrap();

    let err = f
        .service
        .create_snapshot(request(&detail.versions[0].version.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        f.service.list_snapshots("p1").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn snapshots_of_deleted_portfolios_are_not_found() {
    let f = fixture();
    let detail = seed(&f.portfolios, &[("aapl", quantity(dec!(1)))]).await;
    let snapshot = f
        .service
        .create_snapshot(request(&detail.versions[0].version.id))
        .await
        .unwrap();
    f.portfolios
        .soft_delete("p1", Utc::now().naive_utc())
        .await
        .unwrap();

    assert_eq!(
        f.service.get_snapshot(&snapshot.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
