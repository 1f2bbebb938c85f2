//! Configuration management

use clap::Parser;
use config::{Config as ConfigBuilder, ConfigError as BuilderError, Environment as EnvSource, File};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid security configuration: {0}")]
    InvalidSecurity(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// Deployment environment the process runs in.
///
/// Controls how much error detail is exposed to callers: server faults are
/// surfaced verbatim outside production and replaced by a generic message in
/// production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnv {
    Development,
    Test,
    Production,
}

impl RuntimeEnv {
    pub fn is_production(self) -> bool {
        matches!(self, RuntimeEnv::Production)
    }
}

impl fmt::Display for RuntimeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEnv::Development => write!(f, "development"),
            RuntimeEnv::Test => write!(f, "test"),
            RuntimeEnv::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();

        let mut builder = Self::with_defaults(ConfigBuilder::builder())?;

        // Config file (medium priority)
        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(
                    config_path.display().to_string(),
                ));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // Environment variables (higher priority), prefixed with API_KIT_ and
        // using __ for nesting. Example: API_KIT_SERVER__PORT=8080
        builder = builder.add_source(Self::env_source());

        // CLI arguments (highest priority)
        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = Self::with_defaults(ConfigBuilder::builder())?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Config = Self::with_defaults(ConfigBuilder::builder())?
            .add_source(Self::env_source())
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn env_source() -> EnvSource {
        EnvSource::with_prefix("API_KIT")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("security.allowed_origins")
    }

    fn with_defaults(
        builder: config::builder::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.environment", "development")?
            .set_default("server.enable_compression", false)?
            .set_default("server.shutdown_grace", 10)?
            .set_default("security.enable_auth", false)?
            .set_default("security.api_key", "default-api-key")?
            .set_default("security.enable_rate_limit", false)?
            .set_default("security.rate_limit_max_requests", 100)?
            .set_default("security.rate_limit_window_ms", 900_000)?
            .set_default("security.enable_cors", false)?
            .set_default("security.allowed_origins", vec!["*"])?
            .set_default("security.enable_security_headers", false)?
            .set_default("security.enable_hsts", false)?
            .set_default("security.hsts_max_age", 31_536_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("logging.output", "stdout")?)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.security.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Command-line arguments for configuration override
#[derive(Debug, Parser)]
#[command(name = "api-kit")]
#[command(about = "API Kit HTTP server", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server host address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: RuntimeEnv,
    pub enable_compression: bool,
    pub shutdown_grace: u64, // seconds
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer("host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer("port must be greater than 0".to_string()));
        }

        if self.shutdown_grace == 0 {
            return Err(ConfigError::InvalidServer("shutdown_grace must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub enable_auth: bool,
    pub api_key: String,
    pub enable_rate_limit: bool,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: u64,
    pub enable_cors: bool,
    pub allowed_origins: Vec<String>,
    pub enable_security_headers: bool,
    pub enable_hsts: bool,
    pub hsts_max_age: u64, // seconds
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enable_auth && self.api_key.is_empty() {
            return Err(ConfigError::InvalidSecurity(
                "api_key must be provided when enable_auth is true".to_string(),
            ));
        }

        if self.rate_limit_max_requests == 0 {
            return Err(ConfigError::InvalidSecurity(
                "rate_limit_max_requests must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_window_ms == 0 {
            return Err(ConfigError::InvalidSecurity(
                "rate_limit_window_ms must be greater than 0".to_string(),
            ));
        }

        if self.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidSecurity(
                "allowed_origins cannot be empty".to_string(),
            ));
        }

        if self.enable_hsts && self.hsts_max_age == 0 {
            return Err(ConfigError::InvalidSecurity(
                "hsts_max_age must be greater than 0 when enable_hsts is true".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("level must be one of: {:?}", valid_levels),
            ));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("format must be one of: {:?}", valid_formats),
            ));
        }

        let valid_outputs = ["stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(
                format!("output must be one of: {:?}", valid_outputs),
            ));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                environment: RuntimeEnv::Development,
                enable_compression: false,
                shutdown_grace: 10,
            },
            security: SecurityConfig {
                enable_auth: false,
                api_key: "default-api-key".to_string(),
                enable_rate_limit: false,
                rate_limit_max_requests: 100,
                rate_limit_window_ms: 900_000,
                enable_cors: false,
                allowed_origins: vec!["*".to_string()],
                enable_security_headers: false,
                enable_hsts: false,
                hsts_max_age: 31_536_000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                output: "stdout".to_string(),
                log_file: None,
            },
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_auth_enabled_requires_api_key() {
        let mut config = base_config();
        config.security.enable_auth = true;
        config.security.api_key = String::new();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSecurity(_))
        ));
    }

    #[test]
    fn test_zero_rate_limit_quota_rejected() {
        let mut config = base_config();
        config.security.rate_limit_max_requests = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.security.rate_limit_window_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_rejected() {
        let mut config = base_config();
        config.server.host = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidServer(_))
        ));
    }

    #[test]
    fn test_file_output_requires_log_file() {
        let mut config = base_config();
        config.logging.output = "file".to_string();
        config.logging.log_file = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogging(_))
        ));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = base_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_applies_overrides_on_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[server]\nport = 8080\nenvironment = \"production\"\n\n[security]\nenable_auth = true\napi_key = \"secret-key\"\n"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.server.environment.is_production());
        assert!(config.security.enable_auth);
        assert_eq!(config.security.api_key, "secret-key");
        // untouched sections fall back to defaults
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.security.rate_limit_max_requests, 100);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_missing_path() {
        let result = Config::from_file(Path::new("/nonexistent/api-kit.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_runtime_env_display() {
        assert_eq!(RuntimeEnv::Development.to_string(), "development");
        assert_eq!(RuntimeEnv::Production.to_string(), "production");
        assert!(!RuntimeEnv::Test.is_production());
    }
}
