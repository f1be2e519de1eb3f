#![deny(missing_docs)]
//! Shared types for the lens crates.
//!
//! Holds the validated response records for every collaborator endpoint, the
//! error taxonomy, the terminal [`Finish`] record produced by the stream
//! assembler, and the explicit [`CaptureSession`] state used by front-ends.

pub mod capture;
pub mod error;
pub mod image;
pub mod stream;
pub mod types;
pub mod validate;

pub use capture::*;
pub use error::*;
pub use image::*;
pub use stream::*;
pub use types::*;
pub use validate::*;
