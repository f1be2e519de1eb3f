//! Error types for all lens crates.

use std::time::Duration;

/// Errors that end an incremental text stream.
///
/// Carried in [`Finish::error`](crate::Finish::error). Payload decode
/// failures are not errors: unparsable payloads are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// The connection was refused, dropped, or aborted mid-stream.
    #[error("transport error: {0}")]
    Transport(String),
    /// The body was not valid UTF-8.
    #[error("decode error: {0}")]
    Decode(String),
    /// The stream did not finish within the configured deadline.
    #[error("stream timed out after {0:?}")]
    Timeout(Duration),
}

/// A response body did not match the expected record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was absent or null.
    #[error("missing field: {0}")]
    MissingField(String),
    /// A field was present but its value is out of range or empty.
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        /// Dotted path of the offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
    /// The body could not be decoded into the record at all.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidField`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from calls to the collaborator endpoints.
///
/// Every failure is terminal for its request; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network-level error (connection refused, DNS failure, reset).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The request did not complete in time.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// The endpoint rejected the request body.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or the message from an `{"error": ...}` body.
        body: String,
    },
    /// The endpoint answered 2xx with an `{"error": ...}` body.
    #[error("server error: {0}")]
    Server(String),
    /// The response did not match the expected record.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The client is missing configuration for the requested endpoint.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors from capture-session actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// A frame was requested while the camera is off.
    #[error("camera is off")]
    CameraOff,
    /// Submission was requested with no captured image.
    #[error("no image captured")]
    NothingCaptured,
    /// The camera delivered a frame with no bytes.
    #[error("camera frame is empty")]
    EmptyFrame,
    /// A submission is already in flight.
    #[error("a submission is already in progress")]
    Busy,
}

/// Errors from building or parsing an [`ImageData`](crate::ImageData).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    /// The string is not a `data:` URL.
    #[error("not a data URL")]
    NotDataUrl,
    /// The data URL is not base64-encoded.
    #[error("data URL is not base64-encoded")]
    NotBase64,
    /// The base64 payload does not decode.
    #[error("invalid base64 payload: {0}")]
    Base64(String),
    /// The payload is empty.
    #[error("image payload is empty")]
    Empty,
}
