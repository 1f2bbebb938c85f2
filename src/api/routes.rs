//! API routes

use crate::api::handlers::{get_status, health_check, service_info, AppState};
use crate::api::models::ApiResponse;
use axum::{
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

/// Build the API routes
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        // Service metadata (public)
        .route("/", get(service_info))
        // Versioned system endpoints
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/status", get(get_status))
        // Catch-all for unmatched method+path combinations
        .fallback(not_found)
        .with_state(state)
}

/// Catch-all responder producing a 404 error envelope that names the
/// method and path that was not found.
async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(
            "Route not found",
            Some(format!(
                "The requested endpoint {} {} does not exist",
                method,
                uri.path()
            )),
        )),
    )
}
