use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use riskops_core::quotes::{NewQuote, Quote};

async fn save_quote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewQuote>,
) -> ApiResult<(StatusCode, Json<Quote>)> {
    let quote = state.quote_store.save_quote(payload).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/quotes", post(save_quote))
}
