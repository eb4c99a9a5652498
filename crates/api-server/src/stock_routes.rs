//! Raw price history and free-text trend insight.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use pulse_core::{PricePoint, StockHistory};
use serde::{Deserialize, Serialize};

use crate::pulse_routes::TickerRequest;
use crate::{AppError, AppState};

/// Request for an insight on a price history
#[derive(Deserialize)]
pub struct InsightRequest {
    #[serde(default)]
    pub history: Vec<PricePoint>,
}

#[derive(Serialize)]
pub struct InsightResponse {
    pub insight: String,
}

pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stock-data", post(get_stock_data))
        .route("/api/stock-insight", post(get_stock_insight))
}

async fn get_stock_data(
    State(state): State<AppState>,
    payload: Result<Json<TickerRequest>, JsonRejection>,
) -> Result<Json<StockHistory>, AppError> {
    let Json(request) = payload?;
    let ticker = request.ticker.unwrap_or_default();

    let history = state.orchestrator.stock_history(&ticker).await?;
    Ok(Json(history))
}

async fn get_stock_insight(
    State(state): State<AppState>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<InsightResponse>, AppError> {
    let Json(request) = payload?;

    let insight = state.orchestrator.history_insight(&request.history).await?;
    Ok(Json(InsightResponse { insight }))
}
