//! Internal error helpers for mapping HTTP/reqwest errors to [`ClientError`].

use std::time::Duration;

use lens_types::ClientError;

/// Map a non-success HTTP status to a [`ClientError`].
///
/// The endpoints answer failures with `{"error": "..."}`; when the body has
/// that shape only the message is kept.
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> ClientError {
    let message = error_message(body).unwrap_or_else(|| body.trim().to_string());
    match status.as_u16() {
        400 | 422 => ClientError::InvalidRequest(message),
        _ => ClientError::Status {
            status: status.as_u16(),
            body: message,
        },
    }
}

/// The message of an `{"error": ...}` body.
///
/// Accepts a string (`{"error": "bad image"}`) or an object with a
/// `message` field (`{"error": {"message": "bad image"}}`).
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    error_in_value(&value)
}

pub(crate) fn error_in_value(value: &serde_json::Value) -> Option<String> {
    match value.as_object()?.get("error")? {
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Null => None,
        serde_json::Value::Object(inner) => Some(
            inner
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| serde_json::Value::Object(inner.clone()).to_string(), str::to_string),
        ),
        other => Some(other.to_string()),
    }
}

/// Map a [`reqwest::Error`] to a [`ClientError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(timeout)
    } else {
        ClientError::Network(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn bad_request_keeps_error_message() {
        let err = map_http_status(StatusCode::BAD_REQUEST, r#"{"error": "No image data provided"}"#);
        assert!(matches!(err, ClientError::InvalidRequest(ref m) if m == "No image data provided"));
    }

    #[test]
    fn server_errors_keep_status() {
        let err = map_http_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "Internal server error"}"#);
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Internal server error");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_kept_trimmed() {
        let err = map_http_status(StatusCode::BAD_GATEWAY, "  upstream unavailable\n");
        assert!(matches!(err, ClientError::Status { status: 502, ref body } if body == "upstream unavailable"));
    }

    #[test]
    fn error_message_shapes() {
        assert_eq!(error_message(r#"{"error": "x"}"#).as_deref(), Some("x"));
        assert_eq!(error_message(r#"{"error": {"message": "y", "code": 3}}"#).as_deref(), Some("y"));
        assert_eq!(error_message(r#"{"error": {"code": 3}}"#).as_deref(), Some(r#"{"code":3}"#));
        assert_eq!(error_message(r#"{"error": 7}"#).as_deref(), Some("7"));
        assert_eq!(error_message(r#"{"error": null}"#), None);
        assert_eq!(error_message(r#"{"summary": "ok"}"#), None);
        assert_eq!(error_message("[1, 2]"), None);
        assert_eq!(error_message("not json"), None);
    }
}
