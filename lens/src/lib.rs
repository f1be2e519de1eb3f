#![deny(missing_docs)]
//! # lens: umbrella crate
//!
//! A single import surface for capturing an image or question, submitting it
//! to the collaborator endpoints, and rendering the streamed answer as it
//! arrives. Re-exports the member crates behind feature flags, plus a
//! `prelude` for the happy path.

pub use lens_types;
#[cfg(feature = "client")]
pub use lens_client;
#[cfg(feature = "stream")]
pub use lens_stream;

/// Happy-path imports for capture-and-analyze front-ends.
pub mod prelude {
    pub use lens_types::{
        AnalysisRequest, Article, AudioClip, CaptureError, CaptureSession, ClientError, Coordinates,
        DocumentEvent, Finish, FinishReason, ImageData, InspectionReport, ReferralAttributes,
        SiteAssessment, StreamError, ValidationError,
    };

    #[cfg(feature = "stream")]
    pub use lens_stream::{FrameAssembler, MarkdownRenderer, Render, assemble, document_stream};

    #[cfg(feature = "client")]
    pub use lens_client::{Endpoint, LensClient, LensConfig};
}
