//! Mapping of HTTP outcomes onto [`ServiceError`].

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use vet_intake_core::services::ServiceError;

/// Error body shapes the practice API uses.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// User-facing message from an error body, if it carries one.
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// A 404 is kept distinct: for zone lookup it means "not serviced".
pub fn status_error(status: StatusCode, path: &str, body: &str) -> ServiceError {
    if status == StatusCode::NOT_FOUND {
        return ServiceError::NotFound {
            resource: path.to_string(),
            message: error_message(body),
        };
    }
    ServiceError::Status {
        status: status.as_u16(),
        message: error_message(body).unwrap_or_default(),
    }
}

pub fn transport_error(error: reqwest::Error, timeout: Duration) -> ServiceError {
    if error.is_timeout() {
        ServiceError::Timeout(timeout)
    } else if error.is_decode() {
        ServiceError::Decode(error.to_string())
    } else {
        ServiceError::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct() {
        let err = status_error(StatusCode::NOT_FOUND, "/find-zone-by-address", "");
        assert_eq!(
            err,
            ServiceError::NotFound {
                resource: "/find-zone-by-address".into(),
                message: None
            }
        );
    }

    #[test]
    fn test_not_found_body_message_reaches_client() {
        let err = status_error(
            StatusCode::NOT_FOUND,
            "/public/appointments/form",
            r#"{"message": "Practice is not accepting requests"}"#,
        );
        assert_eq!(err.user_message(), Some("Practice is not accepting requests"));
    }

    #[test]
    fn test_status_carries_message() {
        let err = status_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "/public/appointments/form",
            r#"{"message": "Phone number is invalid"}"#,
        );
        assert_eq!(err.user_message(), Some("Phone number is invalid"));
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(error_message(r#"{"error": "Bad zip"}"#).as_deref(), Some("Bad zip"));
        assert_eq!(error_message(r#"{"message": "  "}"#), None);
        assert_eq!(error_message("<html>oops</html>"), None);
    }

    #[test]
    fn test_server_error_without_body() {
        let err = status_error(StatusCode::BAD_GATEWAY, "/routing/v2", "");
        assert_eq!(
            err,
            ServiceError::Status {
                status: 502,
                message: String::new()
            }
        );
        assert_eq!(err.user_message(), None);
    }
}
