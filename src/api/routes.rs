use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::*;
use super::openapi::ApiDoc;

/// Create the API router with Swagger UI
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        // Monitor control
        .route("/start-monitoring", post(start_monitoring))
        .route("/stop-monitoring", post(stop_monitoring))
        .route("/refresh", post(refresh))
        .route("/monitors", get(list_monitors))
        // History
        .route("/history", get(get_history).delete(delete_history))
        .with_state(state)
}
