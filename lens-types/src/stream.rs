//! Outcome and event types for incremental text streams.

use crate::error::StreamError;

/// Why a text stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The `[DONE]` sentinel was received.
    Done,
    /// The connection closed without a sentinel.
    EndOfStream,
    /// The caller cancelled the stream.
    Cancelled,
    /// A transport, decode, or timeout error ended the stream.
    Failed,
}

/// The terminal record of a text stream.
///
/// Produced exactly once per stream. The document is whatever had been
/// assembled when the stream stopped; it is never discarded on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finish {
    /// Why the stream stopped.
    pub reason: FinishReason,
    /// Set when the stream ended because of an error.
    pub error: Option<StreamError>,
    /// The final accumulated document.
    pub document: String,
}

impl Finish {
    /// A stream that ended cleanly (sentinel, close, or cancellation).
    pub fn new(reason: FinishReason, document: String) -> Self {
        Self {
            reason,
            error: None,
            document,
        }
    }

    /// A stream that ended because of `error`.
    pub fn failed(error: StreamError, document: String) -> Self {
        Self {
            reason: FinishReason::Failed,
            error: Some(error),
            document,
        }
    }

    /// Whether the caller should surface a failure indicator.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// An event emitted while assembling a document from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The document grew; carries the full document so far.
    Updated(String),
    /// The stream stopped. Always the last event.
    Finished(Finish),
}
