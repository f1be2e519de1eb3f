//! Byte-level assembly of the accumulated document.

use lens_types::StreamError;

use crate::frame::{FrameScanner, Payload};

/// One change produced by [`FrameAssembler::next_step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Text was appended to the document.
    Appended(String),
    /// The sentinel arrived; the document is final.
    Done,
}

/// Assembles a document from SSE bytes split at arbitrary boundaries.
///
/// Bytes go in through [`push_bytes`](Self::push_bytes); changes come out of
/// [`next_step`](Self::next_step). UTF-8 sequences and frames may straddle
/// pushes. After the sentinel nothing mutates the document again.
///
/// ```
/// use lens_stream::{FrameAssembler, Step};
///
/// let mut assembler = FrameAssembler::new();
/// assembler.push_bytes(b"data: {\"text\":\"Hello, \"}\n\ndata: {\"te").unwrap();
/// assembler.push_bytes(b"xt\":\"world\"}\n\ndata: [DONE]\n\n").unwrap();
/// assembler.finish_input();
/// let steps: Vec<Step> = std::iter::from_fn(|| assembler.next_step()).collect();
/// assert_eq!(steps.last(), Some(&Step::Done));
/// assert_eq!(assembler.document(), "Hello, world");
/// ```
#[derive(Debug, Default)]
pub struct FrameAssembler {
    scanner: FrameScanner,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    undecoded: Vec<u8>,
    document: String,
    done: bool,
    at_eof: bool,
    frames: usize,
}

impl FrameAssembler {
    /// Create an assembler with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk and buffer it for scanning.
    ///
    /// Invalid UTF-8 is a [`StreamError::Decode`]; the text decoded before
    /// the bad byte is still buffered and can be drained after
    /// [`finish_input`](Self::finish_input).
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        if self.done {
            return Ok(());
        }
        self.undecoded.extend_from_slice(chunk);

        let (valid, invalid) = match std::str::from_utf8(&self.undecoded) {
            Ok(_) => (self.undecoded.len(), None),
            // Incomplete sequence at the end: wait for the rest.
            Err(e) if e.error_len().is_none() => (e.valid_up_to(), None),
            Err(e) => (e.valid_up_to(), Some(e)),
        };

        let decoded: Vec<u8> = self.undecoded.drain(..valid).collect();
        let text = String::from_utf8(decoded).map_err(|e| StreamError::Decode(e.to_string()))?;
        self.scanner.push_str(&text);

        match invalid {
            Some(e) => Err(StreamError::Decode(format!(
                "invalid UTF-8 in stream body: {e}"
            ))),
            None => Ok(()),
        }
    }

    /// Mark the end of input so the trailing frame can complete.
    pub fn finish_input(&mut self) {
        self.at_eof = true;
    }

    /// Apply the next complete frame to the document.
    ///
    /// Returns `None` when no complete frame is buffered, or once the
    /// sentinel has been seen. Blank payloads and empty deltas are skipped.
    pub fn next_step(&mut self) -> Option<Step> {
        while !self.done {
            let raw = self.scanner.next_frame(self.at_eof)?;
            self.frames += 1;

            let Some(payload) = Payload::parse(&raw) else {
                continue;
            };
            tracing::trace!(frame = self.frames, ?payload, "sse frame");

            if let Payload::Error { message, .. } = &payload {
                tracing::warn!(frame = self.frames, %message, "server reported an error in-stream");
            }

            match payload.delta() {
                None => {
                    self.done = true;
                    tracing::debug!(frames = self.frames, len = self.document.len(), "stream sentinel received");
                    return Some(Step::Done);
                }
                Some("") => continue,
                Some(delta) => {
                    self.document.push_str(delta);
                    return Some(Step::Appended(delta.to_string()));
                }
            }
        }
        None
    }

    /// Drain every step currently available.
    pub fn drain_steps(&mut self) -> Vec<Step> {
        std::iter::from_fn(|| self.next_step()).collect()
    }

    /// The document assembled so far.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Whether the sentinel has been received.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether input ended in the middle of a UTF-8 sequence.
    pub fn has_partial_char(&self) -> bool {
        !self.undecoded.is_empty()
    }

    /// Number of frames scanned, including skipped ones.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Consume the assembler, keeping the document.
    pub fn into_document(self) -> String {
        self.document
    }
}
