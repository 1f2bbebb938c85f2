pub mod auth;
pub mod error_handler;
pub mod logger;
pub mod rate_limit;
pub mod security;

pub use auth::*;
pub use error_handler::*;
pub use logger::*;
pub use rate_limit::*;
pub use security::*;

use axum::extract::{ConnectInfo, Request};
use axum::http::{header, HeaderMap};
use std::net::{IpAddr, SocketAddr};

/// Extract the client IP address from a request
///
/// Tries, in order:
/// 1. X-Forwarded-For header (comma-separated list, first entry is the client)
/// 2. X-Real-IP header (alternative proxy header)
/// 3. The connection's remote address (direct connections)
pub fn client_ip(request: &Request) -> Option<IpAddr> {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            if let Ok(ip) = ip_str.parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Client identifier used for rate limiting and logs: the IP address, or
/// "unknown" when none can be determined.
pub fn client_key(request: &Request) -> String {
    client_ip(request)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// User-Agent header value, if present and valid UTF-8
pub fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    #[test]
    fn test_client_ip_from_x_forwarded_for() {
        let request = HttpRequest::builder()
            .uri("/test")
            .header("X-Forwarded-For", "192.168.1.100, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&request), Some(IpAddr::from([192, 168, 1, 100])));
    }

    #[test]
    fn test_client_ip_from_x_real_ip() {
        let request = HttpRequest::builder()
            .uri("/test")
            .header("X-Real-IP", "192.168.1.200")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&request), Some(IpAddr::from([192, 168, 1, 200])));
    }

    #[test]
    fn test_client_ip_from_connect_info() {
        let mut request = HttpRequest::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 4567))));

        assert_eq!(client_ip(&request), Some(IpAddr::from([10, 1, 2, 3])));
    }

    #[test]
    fn test_client_key_falls_back_to_unknown() {
        let request = HttpRequest::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_key(&request), "unknown");
    }

    #[test]
    fn test_client_key_ignores_malformed_forwarded_header() {
        let request = HttpRequest::builder()
            .uri("/test")
            .header("X-Forwarded-For", "not-an-ip")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_key(&request), "unknown");
    }
}
