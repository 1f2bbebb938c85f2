//! Security headers middleware
//!
//! Adds security-related HTTP headers to all responses:
//! - X-Content-Type-Options: nosniff (prevents MIME type sniffing)
//! - X-Frame-Options: DENY (prevents clickjacking)
//! - X-XSS-Protection: 1; mode=block (enables XSS filter in older browsers)
//! - Content-Security-Policy: restricts resource loading
//! - Strict-Transport-Security: enforces HTTPS (when enabled)

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let security_config = request
        .extensions()
        .get::<SecurityHeadersConfig>()
        .cloned();

    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();

    parts.headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );

    parts.headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );

    parts.headers.insert(
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("1; mode=block"),
    );

    parts.headers.insert(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:",
        ),
    );

    if let Some(config) = security_config {
        if config.enable_hsts {
            let hsts_value = format!("max-age={}; includeSubDomains", config.hsts_max_age);
            parts.headers.insert(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_str(&hsts_value).unwrap_or_else(|_| {
                    HeaderValue::from_static("max-age=31536000; includeSubDomains")
                }),
            );
        }
    }

    Response::from_parts(parts, body)
}

/// Configuration for security headers
#[derive(Clone, Debug)]
pub struct SecurityHeadersConfig {
    /// Enable HSTS (HTTP Strict Transport Security) header
    pub enable_hsts: bool,
    /// HSTS max-age in seconds
    pub hsts_max_age: u64,
}

impl SecurityHeadersConfig {
    pub fn new(enable_hsts: bool, hsts_max_age: u64) -> Self {
        Self {
            enable_hsts,
            hsts_max_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::util::ServiceExt;

    fn app(config: Option<SecurityHeadersConfig>) -> Router {
        Router::new()
            .route("/test", get(|| async { "OK" }))
            .layer(middleware::from_fn(
                move |mut req: Request, next: Next| {
                    let config = config.clone();
                    async move {
                        if let Some(config) = config {
                            req.extensions_mut().insert(config);
                        }
                        security_headers_middleware(req, next).await
                    }
                },
            ))
    }

    #[tokio::test]
    async fn test_baseline_headers_always_present() {
        let request = axum::http::Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app(None).oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("X-XSS-Protection").unwrap(),
            "1; mode=block"
        );
        assert!(response.headers().contains_key("Content-Security-Policy"));
    }

    #[tokio::test]
    async fn test_csp_directives() {
        let request = axum::http::Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app(None).oneshot(request).await.unwrap();
        let csp = response
            .headers()
            .get("Content-Security-Policy")
            .unwrap()
            .to_str()
            .unwrap();

        assert!(csp.contains("default-src 'self'"));
        assert!(csp.contains("script-src 'self'"));
        assert!(csp.contains("img-src 'self' data: https:"));
    }

    #[tokio::test]
    async fn test_hsts_absent_when_disabled() {
        let request = axum::http::Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app(Some(SecurityHeadersConfig::new(false, 0)))
            .oneshot(request)
            .await
            .unwrap();

        assert!(!response.headers().contains_key("Strict-Transport-Security"));
    }

    #[tokio::test]
    async fn test_hsts_present_when_enabled() {
        let request = axum::http::Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app(Some(SecurityHeadersConfig::new(true, 86400)))
            .oneshot(request)
            .await
            .unwrap();

        let hsts = response
            .headers()
            .get("Strict-Transport-Security")
            .unwrap()
            .to_str()
            .unwrap();

        assert!(hsts.contains("max-age=86400"));
        assert!(hsts.contains("includeSubDomains"));
    }
}
