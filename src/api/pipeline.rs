//! Request-processing pipeline
//!
//! Stages form an explicit ordered list driven by [`Pipeline`]; each stage
//! returns a tagged outcome instead of relying on nested callbacks. A stage
//! either passes the request along, short-circuits with a finished response,
//! or fails with an [`ApiError`] that the terminal error handler turns into a
//! structured response.

use crate::api::middleware::{client_key, ErrorHandler};
use crate::core::error::ApiError;
use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Outcome of applying a single stage to a request
pub enum StageOutcome {
    /// Hand the (possibly modified) request to the next stage
    Continue(Request),
    /// Terminate the chain with a finished response
    ShortCircuit(Response),
}

/// One link in the request-processing chain
///
/// Failing with `Err` routes the request to the terminal error handler;
/// stages that merely deny a request (auth, rate limit) short-circuit with
/// their own response instead.
#[async_trait]
pub trait Stage: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn apply(&self, request: Request) -> Result<StageOutcome, ApiError>;
}

/// Facts about a request captured at pipeline entry, kept for error
/// diagnostics after the request itself has been consumed by the stages.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub ip: String,
    pub headers: HeaderMap,
}

impl RequestInfo {
    pub fn capture(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            ip: client_key(request),
            headers: request.headers().clone(),
        }
    }
}

/// Ordered chain of stages plus the terminal error handler
///
/// `run` drives the stages deterministically, dispatches the surviving
/// request to the router via `next`, and finally rewrites any error a
/// handler surfaced through its response extensions.
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    error_handler: ErrorHandler,
}

impl Pipeline {
    pub fn new(error_handler: ErrorHandler) -> Self {
        Self {
            stages: Vec::new(),
            error_handler,
        }
    }

    /// Append a stage; stages run in insertion order
    pub fn stage(mut self, stage: impl Stage) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub async fn run(&self, mut request: Request, next: Next) -> Response {
        let info = RequestInfo::capture(&request);

        for stage in &self.stages {
            match stage.apply(request).await {
                Ok(StageOutcome::Continue(passed)) => request = passed,
                Ok(StageOutcome::ShortCircuit(response)) => {
                    tracing::debug!(stage = stage.name(), "Pipeline short-circuited");
                    return response;
                }
                Err(error) => {
                    tracing::debug!(stage = stage.name(), "Pipeline stage failed");
                    return self.error_handler.handle(error, &info);
                }
            }
        }

        let response = next.run(request).await;

        // Terminal stage: a failed handler left its error in the response
        // extensions. The response has not been written to the wire yet, so
        // rewriting here is safe and happens exactly once.
        if let Some(error) = response.extensions().get::<ApiError>().cloned() {
            return self.error_handler.handle(error, &info);
        }

        response
    }
}
