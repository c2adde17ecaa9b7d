use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    MonitorInfo, MonitorResult, QuoteRecord, StartMonitoringRequest, SymbolQuery, SymbolRequest,
};
use crate::scheduler::{MonitorError, Scheduler};
use crate::store::HistoryStore;

use super::responses::*;

const SYMBOL_REQUIRED: &str = "symbol is required";
const SYMBOL_REQUIRED_IN_BODY: &str = "symbol is required in body";
const SYMBOL_QUERY_REQUIRED: &str = "symbol query parameter is required";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub store: Arc<HistoryStore>,
}

impl AppState {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        let store = Arc::clone(scheduler.store());
        Self { scheduler, store }
    }
}

/// Errors surfaced by the control endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error(transparent)]
    InvalidInput(#[from] MonitorError),

    #[error("failed to fetch")]
    FetchFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::FetchFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Unreadable bodies are treated as empty, so they fail the symbol check
fn body_or_default<T: DeserializeOwned + Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable request body");
            T::default()
        }
    }
}

/// Unparseable query strings (e.g. a repeated `symbol`) count as a missing symbol
fn symbol_from_query(query: Result<Query<SymbolQuery>, QueryRejection>) -> Result<String, ApiError> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable query string");
            SymbolQuery::default()
        }
    };

    query
        .symbol()
        .map(str::to_string)
        .ok_or(ApiError::BadRequest(SYMBOL_QUERY_REQUIRED))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Start (or restart) polling a symbol
#[utoipa::path(
    post,
    path = "/start-monitoring",
    tag = "Monitoring",
    request_body = StartMonitoringRequest,
    responses(
        (status = 200, description = "Monitor installed", body = MonitorResult),
        (status = 400, description = "Missing symbol or invalid interval", body = ErrorResponse)
    )
)]
pub async fn start_monitoring(
    State(state): State<AppState>,
    body: Result<Json<StartMonitoringRequest>, JsonRejection>,
) -> Result<Json<MonitorResult>, ApiError> {
    let request = body_or_default(body);
    let symbol = request
        .symbol
        .ok_or(ApiError::BadRequest(SYMBOL_REQUIRED))?;

    let result = state
        .scheduler
        .start(&symbol, request.minutes, request.seconds)?;

    Ok(Json(result))
}

/// Stop polling a symbol
///
/// Stopping an unmonitored symbol returns `success: false` with status 200.
#[utoipa::path(
    post,
    path = "/stop-monitoring",
    tag = "Monitoring",
    request_body = SymbolRequest,
    responses(
        (status = 200, description = "Stop outcome", body = MonitorResult),
        (status = 400, description = "Missing symbol", body = ErrorResponse)
    )
)]
pub async fn stop_monitoring(
    State(state): State<AppState>,
    body: Result<Json<SymbolRequest>, JsonRejection>,
) -> Result<Json<MonitorResult>, ApiError> {
    let symbol = body_or_default(body)
        .symbol
        .ok_or(ApiError::BadRequest(SYMBOL_REQUIRED_IN_BODY))?;

    Ok(Json(state.scheduler.stop(&symbol)))
}

/// Fetch a quote now and record it
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "Monitoring",
    request_body = SymbolRequest,
    responses(
        (status = 200, description = "Recorded quote", body = QuoteRecord),
        (status = 400, description = "Missing symbol", body = ErrorResponse),
        (status = 500, description = "Quote provider request failed", body = ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<SymbolRequest>, JsonRejection>,
) -> Result<Json<QuoteRecord>, ApiError> {
    let symbol = body_or_default(body)
        .symbol
        .ok_or(ApiError::BadRequest(SYMBOL_REQUIRED_IN_BODY))?;

    state
        .scheduler
        .refresh_now(&symbol)
        .await
        .map(Json)
        .ok_or(ApiError::FetchFailed)
}

/// Recorded quotes for a symbol, oldest first
#[utoipa::path(
    get,
    path = "/history",
    tag = "History",
    params(SymbolQuery),
    responses(
        (status = 200, description = "Quote history (empty if never observed)", body = Vec<QuoteRecord>),
        (status = 400, description = "Missing symbol", body = ErrorResponse)
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    query: Result<Query<SymbolQuery>, QueryRejection>,
) -> Result<Json<Vec<QuoteRecord>>, ApiError> {
    let symbol = symbol_from_query(query)?;

    Ok(Json(state.store.get(&symbol)))
}

/// Delete every recorded quote for a symbol
///
/// Monitoring, if active, continues.
#[utoipa::path(
    delete,
    path = "/history",
    tag = "History",
    params(SymbolQuery),
    responses(
        (status = 200, description = "Delete outcome", body = MonitorResult),
        (status = 400, description = "Missing symbol", body = ErrorResponse)
    )
)]
pub async fn delete_history(
    State(state): State<AppState>,
    query: Result<Query<SymbolQuery>, QueryRejection>,
) -> Result<Json<MonitorResult>, ApiError> {
    let symbol = symbol_from_query(query)?;

    Ok(Json(state.store.delete_all(&symbol)))
}

/// Active monitors
#[utoipa::path(
    get,
    path = "/monitors",
    tag = "Monitoring",
    responses(
        (status = 200, description = "Active monitors sorted by symbol", body = Vec<MonitorInfo>)
    )
)]
pub async fn list_monitors(State(state): State<AppState>) -> Json<Vec<MonitorInfo>> {
    Json(state.scheduler.monitors())
}
