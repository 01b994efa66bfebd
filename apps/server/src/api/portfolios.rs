use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use riskops_core::portfolio::{
    CreatePortfolioRequest, CreatePortfolioVersionRequest, Portfolio, PortfolioDetail,
    PortfolioResponse, PortfolioVersion, UpdatePortfolioRequest, Valuation, VersionWithPositions,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::user_id;

#[derive(Deserialize)]
struct ListQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct SummaryQuery {
    version_id: Option<String>,
    as_of: Option<DateTime<Utc>>,
    basis: Option<String>,
}

#[derive(Deserialize)]
struct ValuationQuery {
    as_of: Option<DateTime<Utc>>,
    basis: Option<String>,
    snapshot_id: Option<String>,
}

fn parse_basis(raw: Option<&str>) -> ApiResult<Option<Decimal>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid basis value: {}", s))),
    }
}

async fn list_portfolios(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Vec<Portfolio>>> {
    let portfolios = state
        .portfolio_service
        .list_portfolios(q.user_id.as_deref())?;
    Ok(Json(portfolios))
}

async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreatePortfolioRequest>,
) -> ApiResult<(StatusCode, Json<PortfolioDetail>)> {
    let detail = state
        .portfolio_service
        .create_portfolio(payload, user_id(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioDetail>> {
    let detail = state.portfolio_service.get_portfolio(&id)?;
    Ok(Json(detail))
}

async fn update_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePortfolioRequest>,
) -> ApiResult<Json<PortfolioDetail>> {
    let detail = state
        .portfolio_service
        .update_portfolio(&id, payload, user_id(&headers))
        .await?;
    Ok(Json(detail))
}

async fn delete_portfolio(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.portfolio_service.delete_portfolio(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_versions(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PortfolioVersion>>> {
    let versions = state.portfolio_service.list_versions(&id)?;
    Ok(Json(versions))
}

async fn create_version(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreatePortfolioVersionRequest>,
) -> ApiResult<(StatusCode, Json<VersionWithPositions>)> {
    let version = state
        .portfolio_service
        .create_version(&id, payload, user_id(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(version)))
}

async fn set_base_version(
    Path((id, version_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state
        .portfolio_service
        .set_base_version(&id, &version_id)
        .await?;
    Ok(Json(portfolio))
}

async fn get_summary(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<SummaryQuery>,
) -> ApiResult<Json<PortfolioResponse>> {
    let basis = parse_basis(q.basis.as_deref())?;
    let as_of = q.as_of.unwrap_or_else(Utc::now);
    let summary = state
        .portfolio_service
        .get_summary(&id, q.version_id.as_deref(), as_of, basis)
        .await?;
    Ok(Json(summary))
}

async fn get_version_valuation(
    Path((id, version_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<ValuationQuery>,
) -> ApiResult<Json<Valuation>> {
    ensure_version_of(&state, &id, &version_id)?;
    let as_of = q.as_of.unwrap_or_else(Utc::now);
    let valuation = match q.snapshot_id.as_deref() {
        Some(snapshot_id) => {
            state
                .valuation_service
                .valuate_with_snapshot_basis(&version_id, snapshot_id, as_of)
                .await?
        }
        None => {
            let basis = parse_basis(q.basis.as_deref())?;
            state
                .valuation_service
                .valuate_version(&version_id, as_of, basis)
                .await?
        }
    };
    Ok(Json(valuation))
}

/// Fails with `NotFound` unless `version_id` is a version of portfolio `id`.
pub(crate) fn ensure_version_of(state: &AppState, id: &str, version_id: &str) -> ApiResult<()> {
    let versions = state.portfolio_service.list_versions(id)?;
    if versions.iter().any(|v| v.id == version_id) {
        Ok(())
    } else {
        Err(riskops_core::Error::not_found("PortfolioVersion", version_id).into())
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios", get(list_portfolios).post(create_portfolio))
        .route(
            "/portfolios/{id}",
            get(get_portfolio)
                .put(update_portfolio)
                .delete(delete_portfolio),
        )
        .route(
            "/portfolios/{id}/versions",
            get(list_versions).post(create_version),
        )
        .route(
            "/portfolios/{id}/versions/{version_id}/valuation",
            get(get_version_valuation),
        )
        .route(
            "/portfolios/{id}/base-version/{version_id}",
            put(set_base_version),
        )
        .route("/portfolios/{id}/summary", get(get_summary))
}
