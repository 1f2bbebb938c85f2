//! Uniform response envelope

use chrono::Utc;
use serde::Serialize;

/// Envelope wrapping every API response.
///
/// Exactly one of `data` / `error` is populated, matching the `success` flag;
/// `timestamp` is always present (RFC 3339).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn error(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message,
            error: Some(error.into()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = ApiResponse::success_with_message(
            serde_json::json!({"status": "healthy"}),
            "System health check completed",
        );
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["status"], "healthy");
        assert_eq!(value["message"], "System health check completed");
        assert!(value.get("error").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_error_envelope_shape() {
        let envelope = ApiResponse::error("Route not found", None);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Route not found");
        assert!(value.get("data").is_none());
        assert!(value.get("message").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let envelope = ApiResponse::success(serde_json::json!(1));
        assert!(DateTime::parse_from_rfc3339(&envelope.timestamp).is_ok());
    }

    #[test]
    fn test_exactly_one_of_data_and_error() {
        let success = serde_json::to_value(ApiResponse::success(serde_json::json!(42))).unwrap();
        assert!(success.get("data").is_some() && success.get("error").is_none());

        let error =
            serde_json::to_value(ApiResponse::error("boom", Some("detail".into()))).unwrap();
        assert!(error.get("error").is_some() && error.get("data").is_none());
    }
}
