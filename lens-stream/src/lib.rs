#![deny(missing_docs)]
//! Incremental text assembly from server-sent-event streams.
//!
//! The analysis endpoint answers with a body of frames:
//!
//! ```text
//! data: {"text":"Hello, "}
//!
//! data: {"text":"world"}
//!
//! data: [DONE]
//! ```
//!
//! [`FrameAssembler`] turns bytes into a growing document without caring
//! where the transport split them. [`assemble`] drives it from an async byte
//! stream, calls a [`Render`] implementation with the full document after
//! every change, and returns a [`Finish`](lens_types::Finish) once the stream
//! stops.

pub mod assembler;
pub mod frame;
pub mod render;
pub mod stream;

pub use assembler::{FrameAssembler, Step};
pub use frame::{DONE_SENTINEL, FRAME_PREFIX, Payload};
pub use render::{MarkdownRenderer, Render};
pub use stream::{assemble, assemble_with_timeout, document_stream};
