//! HTTP Server implementation
//!
//! This module wires the request-processing pipeline using the Axum
//! framework:
//! - Explicitly constructed stages (rate limiting, authentication) driven by
//!   the pipeline composer
//! - Request completion logging and terminal error handling
//! - Optional CORS, compression and security-header hardening
//! - Graceful shutdown with a bounded grace period

use crate::api::handlers::AppState;
use crate::api::middleware::{
    request_logger, security_headers_middleware, AuthStage, ErrorHandler, RateLimitStage,
    SecurityHeadersConfig,
};
use crate::api::pipeline::Pipeline;
use crate::api::routes::build_api_routes;
use crate::core::Config;
use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    middleware::Next,
    response::Response,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Interval between sweeps of expired rate-limit records
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// HTTP API Server
pub struct ApiServer {
    router: Router,
    config: Arc<Config>,
}

impl ApiServer {
    /// Create a new API server with the given configuration
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let router = Self::build_router(config.clone());

        Self { router, config }
    }

    /// Build the Axum router with all routes and middleware
    pub(crate) fn build_router(config: Arc<Config>) -> Router {
        let state = AppState::new(config.clone());

        let rate_limit_stage = RateLimitStage::new(&config.security);

        // Keyed counters are bounded by window expiry; sweep idle keys so the
        // map does not grow with one record per client forever.
        if config.security.enable_rate_limit {
            let limiter = rate_limit_stage.limiter().clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
                loop {
                    interval.tick().await;
                    limiter.cleanup_expired().await;
                }
            });
        }

        let pipeline = Arc::new(
            Pipeline::new(ErrorHandler::new(config.server.environment))
                .stage(rate_limit_stage)
                .stage(AuthStage::new(&config.security)),
        );

        let mut router = build_api_routes(state)
            .layer(middleware::from_fn(move |request: Request, next: Next| {
                let pipeline = pipeline.clone();
                async move { pipeline.run(request, next).await }
            }))
            .layer(middleware::from_fn(request_logger))
            .layer(TraceLayer::new_for_http());

        if config.security.enable_security_headers {
            let headers_config = SecurityHeadersConfig::new(
                config.security.enable_hsts,
                config.security.hsts_max_age,
            );
            router = router.layer(middleware::from_fn(
                move |mut request: Request, next: Next| {
                    let headers_config = headers_config.clone();
                    async move {
                        request.extensions_mut().insert(headers_config);
                        security_headers_middleware(request, next).await
                    }
                },
            ));
        }

        if config.server.enable_compression {
            router = router
                .layer(CompressionLayer::new())
                .layer(middleware::from_fn(no_compression_opt_out));
        }

        if config.security.enable_cors {
            router = router.layer(Self::build_cors_layer(&config.security.allowed_origins));
        }

        router
    }

    /// Build CORS layer from allowed origins configuration
    fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
        use tower_http::cors::Any;

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                HeaderName::from_static("x-api-key"),
            ])
            .expose_headers([
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderName::from_static("x-ratelimit-reset"),
            ]);

        if allowed_origins.iter().any(|origin| origin == "*") {
            cors.allow_origin(Any)
        } else {
            let origins: Vec<HeaderValue> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            cors.allow_origin(origins)
        }
    }

    /// Start the HTTP server and listen for requests
    ///
    /// Blocks until shutdown. On a termination signal, new connections stop
    /// being accepted and in-flight requests get `shutdown_grace` seconds to
    /// complete before the server force-exits with an error.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let socket_addr: SocketAddr = addr.parse()?;

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        info!(
            addr = %socket_addr,
            environment = %self.config.server.environment,
            api_key_enabled = self.config.security.enable_auth,
            rate_limit_enabled = self.config.security.enable_rate_limit,
            cors_enabled = self.config.security.enable_cors,
            compression_enabled = self.config.server.enable_compression,
            security_headers_enabled = self.config.security.enable_security_headers,
            "API Kit server is running"
        );

        let grace = Duration::from_secs(self.config.server.shutdown_grace);
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let graceful = axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(());
        });

        tokio::select! {
            result = graceful => {
                result?;
                info!("HTTP server shut down gracefully");
                Ok(())
            }
            _ = forced_shutdown(shutdown_rx, grace) => {
                anyhow::bail!(
                    "Forced shutdown: in-flight requests did not complete within {}s",
                    grace.as_secs()
                )
            }
        }
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Compression opt-out: a request carrying X-No-Compression is served with an
/// identity-encoded body. Runs outside the compression layer and clears the
/// negotiation header it keys on.
async fn no_compression_opt_out(mut request: Request, next: Next) -> Response {
    if request.headers().contains_key("x-no-compression") {
        request.headers_mut().remove(header::ACCEPT_ENCODING);
    }

    next.run(request).await
}

/// Resolves once the grace period after a shutdown signal has elapsed.
/// Pends forever if the server finishes draining first.
async fn forced_shutdown(shutdown_rx: tokio::sync::oneshot::Receiver<()>, grace: Duration) {
    match shutdown_rx.await {
        Ok(()) => tokio::time::sleep(grace).await,
        Err(_) => std::future::pending().await,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Initiating graceful shutdown...");
}
