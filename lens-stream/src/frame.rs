//! Frame boundaries and payload classification.
//!
//! A frame is `data: <payload>` ending at a blank line that is followed by
//! the next `data: ` prefix, at a blank line that ends the text received so
//! far, or at end of input. A blank line with more text after it is not a
//! boundary, so payloads may contain newlines.

use serde_json::Value;

/// Prefix that opens every frame.
pub const FRAME_PREFIX: &str = "data: ";

/// Payload that marks the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Blank line followed by the next prefix.
const FRAME_TERMINATOR: &str = "\n\ndata: ";

/// The blank-line part of [`FRAME_TERMINATOR`].
const BLANK_LINE: &str = "\n\n";

/// A classified frame payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A JSON object carrying a string `text` field.
    Text(String),
    /// A JSON object with an `error` field and no `text`: the server's
    /// in-band failure frame. Kept verbatim like any other textless record.
    Error {
        /// The reported error message.
        message: String,
        /// The trimmed payload as received.
        raw: String,
    },
    /// Anything else: not JSON, or JSON without a string `text` field.
    Raw(String),
    /// The `[DONE]` sentinel.
    Done,
}

impl Payload {
    /// Classify a frame payload. Returns `None` for blank payloads.
    pub fn parse(payload: &str) -> Option<Self> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed == DONE_SENTINEL {
            return Some(Self::Done);
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(_) => return Some(Self::Raw(trimmed.to_string())),
        };

        if let Some(text) = value.get("text").and_then(Value::as_str) {
            return Some(Self::Text(text.to_string()));
        }
        if let Some(error) = value.get("error") {
            let message = match error.as_str() {
                Some(s) => s.to_string(),
                None => error.to_string(),
            };
            return Some(Self::Error {
                message,
                raw: trimmed.to_string(),
            });
        }
        Some(Self::Raw(trimmed.to_string()))
    }

    /// The text this payload appends to the document. `None` for the sentinel.
    pub fn delta(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Error { raw, .. } | Self::Raw(raw) => Some(raw),
            Self::Done => None,
        }
    }
}

/// Splits decoded text into frame payloads.
///
/// A trailing frame is emitted as soon as the buffer ends in a blank line.
/// Otherwise it is held back until its terminator arrives or input ends.
#[derive(Debug, Default)]
pub(crate) struct FrameScanner {
    buffer: String,
    /// Byte offset before which no terminator can start in the current frame.
    searched: usize,
}

impl FrameScanner {
    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Bytes held that have not been emitted as a frame yet.
    pub(crate) fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete frame payload, untrimmed.
    ///
    /// With `at_eof` set, end of input closes the trailing frame.
    pub(crate) fn next_frame(&mut self, at_eof: bool) -> Option<String> {
        if !self.align_to_prefix(at_eof) {
            return None;
        }

        let body = FRAME_PREFIX.len();
        let from = self.searched.max(body);
        match find_from(&self.buffer, FRAME_TERMINATOR, from) {
            Some(end) => {
                let payload = self.buffer[body..end].to_string();
                // Keep the next frame's prefix at the front.
                self.buffer.drain(..end + BLANK_LINE.len());
                self.searched = 0;
                Some(payload)
            }
            None if at_eof => {
                let payload = self.buffer[body..].to_string();
                self.buffer.clear();
                self.searched = 0;
                Some(payload)
            }
            // A blank line at the very end of what has arrived closes the
            // frame now instead of waiting for the next prefix.
            None if self.buffer.ends_with(BLANK_LINE) && self.buffer.len() >= body + BLANK_LINE.len() => {
                let payload = self.buffer[body..self.buffer.len() - BLANK_LINE.len()].to_string();
                self.buffer.clear();
                self.searched = 0;
                Some(payload)
            }
            None => {
                // A terminator may still begin in the last few bytes.
                self.searched = self
                    .buffer
                    .len()
                    .saturating_sub(FRAME_TERMINATOR.len() - 1)
                    .max(body);
                None
            }
        }
    }

    /// Drop anything ahead of the first frame prefix.
    ///
    /// Returns whether the buffer now starts with a prefix. Without one, only
    /// a tail that could still grow into a prefix is kept.
    fn align_to_prefix(&mut self, at_eof: bool) -> bool {
        if self.buffer.starts_with(FRAME_PREFIX) {
            return true;
        }
        self.searched = 0;
        if let Some(start) = self.buffer.find(FRAME_PREFIX) {
            self.buffer.drain(..start);
            return true;
        }
        if at_eof {
            self.buffer.clear();
        } else {
            let keep = partial_prefix_len(&self.buffer);
            let cut = self.buffer.len() - keep;
            self.buffer.drain(..cut);
        }
        false
    }
}

/// Length of the longest suffix of `buffer` that is a proper prefix of
/// [`FRAME_PREFIX`].
fn partial_prefix_len(buffer: &str) -> usize {
    (1..FRAME_PREFIX.len())
        .rev()
        .find(|&n| buffer.ends_with(&FRAME_PREFIX[..n]))
        .unwrap_or(0)
}

/// Byte-level search starting at `from`. `needle` is ASCII, so every match
/// lands on a char boundary.
fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack
        .as_bytes()
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle.as_bytes())
        .map(|i| i + from)
}
