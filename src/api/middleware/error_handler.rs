//! Terminal error handler
//!
//! Converts any failure signalled by a stage or handler into a structured
//! error response. Each incident gets a unique identifier correlating the
//! server-side diagnostic record with the message shown to the caller.
//!
//! Message policy: client errors (<500) expose the raw message everywhere;
//! server faults (>=500) expose the raw message outside production and a
//! generic one in production. This asymmetry is intentional and trades
//! debuggability against information leakage.

use crate::api::models::ApiResponse;
use crate::api::pipeline::RequestInfo;
use crate::core::config::RuntimeEnv;
use crate::core::error::ApiError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct ErrorHandler {
    environment: RuntimeEnv,
}

impl ErrorHandler {
    pub fn new(environment: RuntimeEnv) -> Self {
        Self { environment }
    }

    /// Build the terminal response for a failed request
    pub fn handle(&self, error: ApiError, info: &RequestInfo) -> Response {
        let error_id = generate_error_id();
        let status = error.status_code();
        let production = self.environment.is_production();

        // Full context is always logged server-side; the debug detail is
        // withheld in production only from the log record's detail field.
        let detail = (!production).then(|| format!("{:?}", error));
        tracing::error!(
            error_id = %error_id,
            error_type = error.error_type(),
            status = %status,
            method = %info.method,
            path = %info.path,
            query = info.query.as_deref().unwrap_or(""),
            ip = %info.ip,
            headers = ?info.headers,
            detail = detail.as_deref().unwrap_or(""),
            "Unhandled error: {}",
            error
        );

        let exposed = if status.is_client_error() {
            error.to_string()
        } else if production {
            "Internal server error".to_string()
        } else {
            error.to_string()
        };

        let message = if production {
            format!(
                "Error ID: {}. Please contact support if the issue persists.",
                error_id
            )
        } else {
            format!("Error ID: {}. {:?}", error_id, error)
        };

        (status, Json(ApiResponse::error(exposed, Some(message)))).into_response()
    }
}

/// Unique incident identifier: millisecond timestamp plus a random suffix,
/// both base36.
fn generate_error_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let suffix: u64 = rand::thread_rng().gen();
    format!("{}{}", to_base36(millis), to_base36(suffix))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut out = String::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.chars().rev().collect()
}
