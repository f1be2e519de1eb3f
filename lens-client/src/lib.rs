#![deny(missing_docs)]
//! HTTP client for the lens collaborator endpoints.
//!
//! # Usage
//!
//! ```no_run
//! use lens_client::{Endpoint, LensClient};
//!
//! let client = LensClient::new()
//!     .endpoint(Endpoint::Analysis, "https://example.run.app/nutrition-analysis")
//!     .endpoint(Endpoint::Audio, "https://example.run.app/generate-audio");
//! ```
//!
//! # Features
//!
//! - Streaming analysis rendered incrementally through [`lens_stream`]
//! - Literature retrieval, image inspection, site pre-check, speech
//!   synthesis, and referral extraction
//! - Every JSON response validated into a typed record
//! - Configuration from builder calls, environment variables, or JSON
//! - Error mapping from HTTP status codes to [`ClientError`] variants

pub mod client;
pub mod config;
pub(crate) mod error;
pub mod mapping;
pub(crate) mod streaming;

pub use client::LensClient;
pub use config::{Endpoint, LensConfig};

// Re-export lens-types for convenience
pub use lens_types::{ClientError, DocumentEvent, Finish, FinishReason};
