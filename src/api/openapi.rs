use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::responses::*;
use crate::models::{MonitorInfo, MonitorResult, QuoteRecord, StartMonitoringRequest, SymbolRequest};

/// OpenAPI document for the control surface
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quote Monitor API",
        version = "0.1.0",
        description = "Polls a quote provider per symbol on a timer and keeps an in-memory history",
        license(
            name = "MIT"
        )
    ),
    paths(
        handlers::health_check,
        handlers::start_monitoring,
        handlers::stop_monitoring,
        handlers::refresh,
        handlers::get_history,
        handlers::delete_history,
        handlers::list_monitors,
    ),
    components(
        schemas(
            QuoteRecord,
            MonitorResult,
            MonitorInfo,
            StartMonitoringRequest,
            SymbolRequest,
            HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Monitoring", description = "Start, stop and refresh per-symbol polling"),
        (name = "History", description = "Recorded quote history"),
    )
)]
pub struct ApiDoc;
