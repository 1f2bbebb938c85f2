//! Rate limiting with a per-key quota over a fixed window
//!
//! Each client key gets `max_points` request points per window. Consuming a
//! point decrements the remaining quota; once exhausted, further attempts are
//! rejected until the window deadline passes, at which point the key regains
//! its full quota. State is in-memory only, suitable for single-instance
//! deployments.

use crate::api::middleware::{client_key, user_agent};
use crate::api::models::ApiResponse;
use crate::api::pipeline::{Stage, StageOutcome};
use crate::core::config::SecurityConfig;
use crate::core::error::ApiError;
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Keyed quota counter shared across concurrent requests
#[derive(Clone)]
pub struct RateLimiter {
    /// Shared state mapping client keys to their quota records
    state: Arc<RwLock<HashMap<String, RateLimitRecord>>>,
    /// Quota points granted per window
    max_points: u32,
    /// Window duration
    window: Duration,
}

/// Per-key quota record, owned exclusively by the rate limiter.
/// Created lazily on the first request from a key.
#[derive(Debug)]
struct RateLimitRecord {
    points_remaining: u32,
    total_hits: u32,
    window_reset: Instant,
}

/// Details carried by a rejected consumption attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRejection {
    pub remaining_points: u32,
    pub ms_before_next: u64,
    pub total_hits: u32,
}

impl RateLimiter {
    pub fn new(max_points: u32, window: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            max_points,
            window,
        }
    }

    /// Create a rate limiter from security configuration
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.rate_limit_max_requests,
            Duration::from_millis(config.rate_limit_window_ms),
        )
    }

    /// Consume one quota point for the given key
    ///
    /// Returns Ok(()) while the key has points left in the current window,
    /// Err(rejection) once the quota is exhausted.
    pub async fn consume(&self, key: &str) -> Result<(), RateLimitRejection> {
        let mut state = self.state.write().await;
        let now = Instant::now();

        let record = state
            .entry(key.to_string())
            .or_insert_with(|| RateLimitRecord {
                points_remaining: self.max_points,
                total_hits: 0,
                window_reset: now + self.window,
            });

        // Idempotent reset: the key regains its full quota, not a cumulative one
        if now >= record.window_reset {
            record.points_remaining = self.max_points;
            record.total_hits = 0;
            record.window_reset = now + self.window;
        }

        record.total_hits += 1;

        if record.points_remaining == 0 {
            return Err(RateLimitRejection {
                remaining_points: 0,
                ms_before_next: record
                    .window_reset
                    .saturating_duration_since(now)
                    .as_millis() as u64,
                total_hits: record.total_hits,
            });
        }

        record.points_remaining -= 1;
        Ok(())
    }

    /// Drop records whose window has elapsed so idle keys don't accumulate
    pub async fn cleanup_expired(&self) {
        let mut state = self.state.write().await;
        let now = Instant::now();
        state.retain(|_, record| record.window_reset > now);
    }
}

/// Pipeline stage enforcing the request quota
///
/// Disabled entirely when the feature toggle is off: requests pass through
/// unconditionally, no record is created and no headers are set. On rejection
/// the stage short-circuits with 429, the rate-limit headers, and an error
/// envelope stating the retry delay.
pub struct RateLimitStage {
    limiter: RateLimiter,
    enabled: bool,
    limit: u32,
}

impl RateLimitStage {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            limiter: RateLimiter::from_config(config),
            enabled: config.enable_rate_limit,
            limit: config.rate_limit_max_requests,
        }
    }

    /// Handle to the underlying limiter, e.g. for the periodic cleanup task
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    fn rejection_response(&self, rejection: &RateLimitRejection) -> axum::response::Response {
        let retry_after_secs = ((rejection.ms_before_next as f64) / 1000.0).round() as u64;
        let reset_at =
            (Utc::now() + chrono::Duration::milliseconds(rejection.ms_before_next as i64))
                .to_rfc3339();

        let body = Json(ApiResponse::error(
            "Too many requests",
            Some(format!(
                "Rate limit exceeded. Try again in {} seconds.",
                retry_after_secs
            )),
        ));

        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            HeaderName::from_static("retry-after"),
            HeaderValue::from(retry_after_secs),
        );
        headers.insert(
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderValue::from(self.limit),
        );
        headers.insert(
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderValue::from(rejection.remaining_points),
        );
        headers.insert(
            HeaderName::from_static("x-ratelimit-reset"),
            HeaderValue::from_str(&reset_at).unwrap_or_else(|_| HeaderValue::from_static("")),
        );

        response
    }
}

#[async_trait]
impl Stage for RateLimitStage {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    async fn apply(&self, request: Request) -> Result<StageOutcome, ApiError> {
        if !self.enabled {
            return Ok(StageOutcome::Continue(request));
        }

        let key = client_key(&request);
        match self.limiter.consume(&key).await {
            Ok(()) => Ok(StageOutcome::Continue(request)),
            Err(rejection) => {
                tracing::warn!(
                    ip = %key,
                    path = request.uri().path(),
                    method = %request.method(),
                    remaining_points = rejection.remaining_points,
                    total_hits = rejection.total_hits,
                    ms_before_next = rejection.ms_before_next,
                    user_agent = user_agent(request.headers()).unwrap_or(""),
                    "Rate limit exceeded"
                );

                Ok(StageOutcome::ShortCircuit(
                    self.rejection_response(&rejection),
                ))
            }
        }
    }
}
