//! API Kit
//!
//! A minimal HTTP API scaffold: a health/status endpoint behind optional
//! API-key authentication, optional rate limiting, and standard HTTP
//! hardening (CORS, compression, security headers).

pub mod api;
pub mod core;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::{ApiError, Config, Logger};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
