use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use riskops_core::portfolio::{CreateSnapshotRequest, PortfolioSnapshot};

use super::portfolios::ensure_version_of;

async fn list_snapshots(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PortfolioSnapshot>>> {
    // Resolves deleted or unknown portfolios to 404.
    state.portfolio_service.get_portfolio(&id)?;
    let snapshots = state.snapshot_service.list_snapshots(&id)?;
    Ok(Json(snapshots))
}

async fn create_snapshot(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSnapshotRequest>,
) -> ApiResult<(StatusCode, Json<PortfolioSnapshot>)> {
    ensure_version_of(&state, &id, &payload.version_id)?;
    let snapshot = state.snapshot_service.create_snapshot(payload).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn get_snapshot(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioSnapshot>> {
    let snapshot = state.snapshot_service.get_snapshot(&id)?;
    Ok(Json(snapshot))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/portfolios/{id}/snapshots",
            get(list_snapshots).post(create_snapshot),
        )
        .route("/snapshots/{id}", get(get_snapshot))
}
