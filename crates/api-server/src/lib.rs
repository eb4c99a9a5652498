//! Market Pulse HTTP API.
//!
//! Wires the Alpha Vantage, NewsAPI and Gemini clients into a
//! [`PulseOrchestrator`] and exposes it over axum.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{body::Body, http::Request, middleware, routing::get, Json, Router};
use llm_client::{GeminiClient, LlmConfig};
use market_data_client::{AlphaVantageClient, NewsApiClient};
use pulse_orchestrator::{PulseOrchestrator, PulseSettings};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
mod error;
mod pulse_routes;
mod request_id;
mod stock_routes;


pub use config::ServerConfig;
pub use error::{AppError, ErrorBody};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PulseOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: PulseOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Build the real provider clients from configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        let mut prices = AlphaVantageClient::new(config.stock_api_key.clone(), config.provider_timeout);
        if let Some(url) = &config.alpha_vantage_base_url {
            prices = prices.with_base_url(url.as_str());
        }

        let mut news = NewsApiClient::new(config.news_api_key.clone(), config.provider_timeout);
        if let Some(url) = &config.news_api_base_url {
            news = news.with_base_url(url.as_str());
        }

        let mut llm_config = LlmConfig::new(config.gemini_api_key.clone())
            .with_model(config.gemini_model.clone())
            .with_timeout(config.provider_timeout);
        if let Some(url) = &config.gemini_base_url {
            llm_config = llm_config.with_base_url(url.as_str());
        }

        let orchestrator = PulseOrchestrator::new(
            Arc::new(prices),
            Arc::new(news),
            Arc::new(GeminiClient::new(llm_config)),
        )
        .with_settings(PulseSettings {
            provider_timeout: config.provider_timeout,
            keyword_fallback: config.llm_keyword_fallback,
            ..PulseSettings::default()
        });

        Self::new(orchestrator)
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Full router with middleware applied
pub fn build_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id::request_id_of(request),
        )
    });

    Router::new()
        .route("/health", get(health))
        .merge(pulse_routes::pulse_routes())
        .merge(stock_routes::stock_routes())
        .with_state(state)
        .layer(trace)
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Install the global tracing subscriber. `RUST_LOG_FORMAT=json` switches to
/// JSON lines.
pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  LLM model: {}", config.gemini_model);
    tracing::info!("  Provider timeout: {}s", config.provider_timeout.as_secs());
    tracing::info!("  Keyword fallback: {}", config.llm_keyword_fallback);

    let app = build_router(AppState::from_config(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Market Pulse API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
