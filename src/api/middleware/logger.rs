//! Request completion logger
//!
//! Records a wall-clock start at pipeline entry and emits one record per
//! completed request: method, url, status, duration, client ip, user-agent,
//! content-length and referer. Responses with status >= 400 log at warn,
//! everything else at info. Purely observational: never blocks or delays the
//! request.

use crate::api::middleware::{client_key, user_agent};
use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info_span, Instrument};

pub async fn request_logger(request: Request, next: Next) -> Response {
    let started = Instant::now();

    let method = request.method().clone();
    let uri = request.uri().clone();
    let ip = client_key(&request);
    let agent = user_agent(request.headers()).unwrap_or("").to_string();
    let referer = request
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let span = info_span!("http_request", method = %method, uri = %uri, ip = %ip);
    let response = next.run(request).instrument(span).await;

    let status = response.status();
    let duration_ms = started.elapsed().as_millis() as u64;
    let content_length = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if status.as_u16() >= 400 {
        tracing::warn!(
            method = %method,
            url = %uri,
            status = status.as_u16(),
            duration = %format!("{}ms", duration_ms),
            ip = %ip,
            user_agent = %agent,
            content_length = %content_length,
            referer = %referer,
            "Request completed"
        );
    } else {
        tracing::info!(
            method = %method,
            url = %uri,
            status = status.as_u16(),
            duration = %format!("{}ms", duration_ms),
            ip = %ip,
            user_agent = %agent,
            content_length = %content_length,
            referer = %referer,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::util::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "OK" }))
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, "gone") }),
            )
            .layer(middleware::from_fn(request_logger))
    }

    #[tokio::test]
    async fn test_logger_passes_success_through() {
        let request = axum::http::Request::builder()
            .uri("/ok")
            .header("User-Agent", "api-kit-test")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_logger_passes_error_status_through() {
        let request = axum::http::Request::builder()
            .uri("/missing")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
