//! API Kit - Rust Implementation
//!
//! Minimal HTTP API scaffold with optional API-key authentication, rate
//! limiting and HTTP hardening.

use api_kit::{api, core};

use anyhow::Result;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    // A panic anywhere is an unrecoverable process-level fault: log it and
    // terminate with a nonzero code, leaving restarts to the supervisor.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!("Uncaught panic: {}", panic_info);
        default_panic(panic_info);
        std::process::exit(1);
    }));

    info!("Configuration loaded successfully");
    info!("Starting API Kit v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        environment = %config.server.environment,
        "Server configuration"
    );

    let server = api::ApiServer::new(config);

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
