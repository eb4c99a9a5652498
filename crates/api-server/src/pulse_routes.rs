//! Market Pulse Routes
//!
//! `GET` aggregates prices, news and an LLM verdict; `POST` returns the
//! LLM narrative alone.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use pulse_core::PulseResponse;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};

/// Query parameters for the aggregated pulse
#[derive(Deserialize)]
pub struct PulseQuery {
    pub ticker: Option<String>,
}

/// Body carrying a single ticker
#[derive(Deserialize)]
pub struct TickerRequest {
    pub ticker: Option<String>,
}

#[derive(Serialize)]
pub struct ExplanationResponse {
    pub explanation: String,
}

pub fn pulse_routes() -> Router<AppState> {
    Router::new().route(
        "/api/market-pulse",
        get(get_market_pulse).post(explain_market_pulse),
    )
}

async fn get_market_pulse(
    State(state): State<AppState>,
    query: Result<Query<PulseQuery>, QueryRejection>,
) -> Result<Json<PulseResponse>, AppError> {
    let Query(query) = query?;
    let ticker = query.ticker.unwrap_or_default();

    let pulse = state.orchestrator.market_pulse(&ticker).await?;
    Ok(Json(pulse))
}

async fn explain_market_pulse(
    State(state): State<AppState>,
    payload: Result<Json<TickerRequest>, JsonRejection>,
) -> Result<Json<ExplanationResponse>, AppError> {
    let Json(request) = payload?;
    let ticker = request
        .ticker
        .ok_or_else(|| AppError::bad_request("Invalid ticker symbol.", None))?;

    let explanation = state.orchestrator.explain(&ticker).await?;
    Ok(Json(ExplanationResponse { explanation }))
}
