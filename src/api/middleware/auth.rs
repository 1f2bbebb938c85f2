//! API key authentication
//!
//! Validates the shared-secret credential from the X-API-Key header, falling
//! back to a Bearer-prefixed Authorization header. A small route allowlist is
//! always public; every other path is gated when the toggle is on.

use crate::api::middleware::{client_key, user_agent};
use crate::api::models::ApiResponse;
use crate::api::pipeline::{Stage, StageOutcome};
use crate::core::config::SecurityConfig;
use crate::core::error::ApiError;
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// HTTP header name carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Paths that bypass authentication regardless of the toggle
const PUBLIC_PATHS: [&str; 2] = ["/", "/favicon.ico"];

/// Pipeline stage gating protected routes behind the configured API key
pub struct AuthStage {
    enabled: bool,
    api_key: String,
}

impl AuthStage {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            enabled: config.enable_auth,
            api_key: config.api_key.clone(),
        }
    }

    /// Read the credential from X-API-Key, falling back to a Bearer token
    fn credential(request: &Request) -> Option<String> {
        request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| {
                request
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .map(str::to_string)
            })
    }
}

#[async_trait]
impl Stage for AuthStage {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn apply(&self, request: Request) -> Result<StageOutcome, ApiError> {
        if PUBLIC_PATHS.contains(&request.uri().path()) {
            return Ok(StageOutcome::Continue(request));
        }

        if !self.enabled {
            return Ok(StageOutcome::Continue(request));
        }

        let ip = client_key(&request);
        let path = request.uri().path().to_string();
        let agent = user_agent(request.headers()).unwrap_or("").to_string();

        match Self::credential(&request) {
            None => {
                tracing::warn!(
                    ip = %ip,
                    path = %path,
                    user_agent = %agent,
                    "API key missing in request"
                );

                Ok(StageOutcome::ShortCircuit(unauthorized(
                    "API key required",
                    "Missing X-API-Key header or Authorization Bearer token",
                )))
            }
            Some(provided) if provided != self.api_key => {
                // never log the full credential
                let prefix: String = provided.chars().take(8).collect();
                tracing::warn!(
                    ip = %ip,
                    path = %path,
                    provided_key = %format!("{}...", prefix),
                    user_agent = %agent,
                    "Invalid API key used"
                );

                Ok(StageOutcome::ShortCircuit(unauthorized(
                    "Invalid API key",
                    "The provided API key is not valid",
                )))
            }
            Some(_) => {
                tracing::info!(
                    ip = %ip,
                    path = %path,
                    user_agent = %agent,
                    "Valid API key used"
                );

                Ok(StageOutcome::Continue(request))
            }
        }
    }
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::error(error, Some(message.to_string()))),
    )
        .into_response()
}
