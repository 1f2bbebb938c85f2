use serde::Serialize;

// Health API models

/// Payload for GET /api/v1/health
#[derive(Debug, Serialize)]
pub struct HealthPayload {
    /// Overall health status
    pub status: HealthStatus,
    /// Seconds since the server started
    pub uptime_seconds: f64,
    /// Host and runtime information
    pub system: SystemInfo,
    /// Service identity and feature flags
    pub api: ApiInfo,
    /// Time spent assembling this payload in milliseconds
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Host and runtime information
#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub environment: String,
    pub platform: String,
    pub arch: String,
    pub pid: u32,
}

/// Service identity and feature flags
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    pub features: FeatureFlags,
}

/// Feature toggles resolved from configuration
#[derive(Debug, Serialize)]
pub struct FeatureFlags {
    pub api_key_enabled: bool,
    pub rate_limit_enabled: bool,
    pub cors_enabled: bool,
    pub compression_enabled: bool,
    pub security_headers_enabled: bool,
}

// Status API models

/// Payload for GET /api/v1/status - lightweight liveness info
#[derive(Debug, Serialize)]
pub struct StatusPayload {
    pub status: &'static str,
    pub uptime_seconds: f64,
    pub pid: u32,
    pub platform: String,
    pub arch: String,
}

// Root endpoint models

/// Static service metadata served at the root path
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: EndpointMap,
}

#[derive(Debug, Serialize)]
pub struct EndpointMap {
    pub health: &'static str,
    pub status: &'static str,
}
