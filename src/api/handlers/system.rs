//! System endpoints: service metadata, health and status

use crate::api::models::{
    ApiInfo, ApiResponse, EndpointMap, FeatureFlags, HealthPayload, HealthStatus, ServiceInfo,
    StatusPayload, SystemInfo,
};
use crate::core::error::{ApiError, Result};
use axum::{extract::State, response::IntoResponse, Json};
use std::time::Instant;

use super::AppState;

/// Service name reported by the root and health endpoints
pub const SERVICE_NAME: &str = "API Kit";

const HEALTH_PATH: &str = "/api/v1/health";
const STATUS_PATH: &str = "/api/v1/status";

/// Handler for GET / - static service metadata (always public)
pub async fn service_info() -> impl IntoResponse {
    Json(ApiResponse::success(ServiceInfo {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Minimal HTTP API scaffold with optional API-key authentication, rate limiting and HTTP hardening".to_string(),
        endpoints: EndpointMap {
            health: HEALTH_PATH,
            status: STATUS_PATH,
        },
    }))
}

/// Handler for GET /api/v1/health - aggregated process and feature status
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let started = Instant::now();

    let hostname = hostname::get()
        .map_err(|e| ApiError::Internal(format!("Failed to resolve hostname: {}", e)))?
        .to_string_lossy()
        .into_owned();

    let server = &state.config.server;
    let security = &state.config.security;

    let payload = HealthPayload {
        status: HealthStatus::Healthy,
        uptime_seconds: state.uptime().as_secs_f64(),
        system: SystemInfo {
            hostname,
            environment: server.environment.to_string(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            pid: std::process::id(),
        },
        api: ApiInfo {
            name: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            features: FeatureFlags {
                api_key_enabled: security.enable_auth,
                rate_limit_enabled: security.enable_rate_limit,
                cors_enabled: security.enable_cors,
                compression_enabled: server.enable_compression,
                security_headers_enabled: security.enable_security_headers,
            },
        },
        response_time_ms: started.elapsed().as_millis() as u64,
    };

    Ok(Json(ApiResponse::success_with_message(
        payload,
        "System health check completed",
    )))
}

/// Handler for GET /api/v1/status - lightweight liveness info
pub async fn get_status(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let payload = StatusPayload {
        status: "active",
        uptime_seconds: state.uptime().as_secs_f64(),
        pid: std::process::id(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    };

    Ok(Json(ApiResponse::success_with_message(
        payload,
        "Service status retrieved",
    )))
}
