//! REST API module
//!
//! This module provides the HTTP server and REST API endpoints including:
//! - The staged request-processing pipeline
//! - Authentication and rate-limiting stages
//! - Request logging and terminal error handling
//! - Response envelope formatting

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod server;

pub use models::ApiResponse;
pub use pipeline::{Pipeline, RequestInfo, Stage, StageOutcome};
pub use server::ApiServer;
