//! Turning an analysis response into a byte stream for the assembler.

use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use lens_types::ClientError;

use crate::error::{error_message, map_http_status, map_reqwest_error};

/// Body of an analysis response, as the assembler consumes it.
pub(crate) type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Check an analysis response and hand back its body stream.
///
/// Non-2xx statuses are mapped before any frame is read. A 2xx answer with a
/// JSON content type is read whole: an `{"error": ...}` body becomes
/// [`ClientError::Server`], anything else is fed to the assembler as-is.
pub(crate) async fn open_body(response: reqwest::Response, timeout: Duration) -> Result<ByteStream, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.map_err(|e| map_reqwest_error(e, timeout))?;
        return Err(map_http_status(status, &body));
    }

    if is_json(&response) {
        let body = response.bytes().await.map_err(|e| map_reqwest_error(e, timeout))?;
        if let Some(message) = std::str::from_utf8(&body).ok().and_then(error_message) {
            return Err(ClientError::Server(message));
        }
        tracing::warn!("analysis endpoint answered with JSON instead of an event stream");
        return Ok(futures::stream::once(async move { Ok(body) }).boxed());
    }

    Ok(response.bytes_stream().boxed())
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}
