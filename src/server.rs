//! HTTP surface for the scraping pipeline
//!
//! A small axum router exposing the average-price endpoint and a health
//! check. Each request builds its own scraper over the shared config, so
//! concurrent requests share no mutable state.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::application::analyzer::{analyze, AnalysisError, OutlierPolicy};
use crate::application::scraper::SoldListingsScraper;
use crate::infrastructure::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// Build the axum application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/ebay-average", post(ebay_average_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
pub struct AverageRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct AverageResponse {
    pub average_price: f64,
    pub listings_count: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: &str) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Health check endpoint.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Average sold price for a search URL.
///
/// Scrapes at most the configured server page budget, analyzes the
/// prices, and returns the rounded average with the sample size. Error
/// detail beyond the taxonomy below stays in the log; the wire message
/// is deliberately opaque.
pub async fn ebay_average_handler(
    State(state): State<AppState>,
    Json(request): Json<AverageRequest>,
) -> Result<Json<AverageResponse>, HandlerError> {
    let url = match request.url.as_deref() {
        Some(url) if !url.trim().is_empty() => url.to_string(),
        _ => return Err(error_response(StatusCode::BAD_REQUEST, "URL is required")),
    };

    info!("Fetching average for: {:.50}...", url);

    let scraper = SoldListingsScraper::from_config(&state.config).map_err(|e| {
        error!("Failed to construct scraper: {:#}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    let listings = scraper.scrape(&url, state.config.server_max_pages).await;

    let stats = analyze(&listings, OutlierPolicy::from(state.config.outlier)).map_err(|e| {
        let message = match e {
            AnalysisError::NoListingsFound => "No listings found",
            AnalysisError::NoValidPriceData => "No valid price data found",
        };
        error_response(StatusCode::NOT_FOUND, message)
    })?;

    Ok(Json(AverageResponse {
        average_price: round_cents(stats.average),
        listings_count: stats.count,
    }))
}

/// Round to two decimal places for the wire format.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
