//! Core application layer
//!
//! This module provides:
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigError, RuntimeEnv};
pub use error::{ApiError, Result};
pub use logging::Logger;
