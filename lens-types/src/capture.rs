//! Explicit state for the capture-and-submit workflow.
//!
//! Each action takes the session by value and hands back the next session,
//! so front-ends never share mutable flags between handlers.

use crate::error::{CaptureError, ImageError};
use crate::image::ImageData;

/// Camera and submission state for one capture screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSession {
    /// Whether the camera preview is live.
    pub camera_on: bool,
    /// The image awaiting confirmation, if any.
    pub captured: Option<ImageData>,
    /// Whether a submission is in flight.
    pub busy: bool,
}

impl CaptureSession {
    /// A fresh session: camera off, nothing captured, idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the camera on or off. A captured image survives either way.
    #[must_use]
    pub fn toggle_camera(self) -> Self {
        Self {
            camera_on: !self.camera_on,
            ..self
        }
    }

    /// Store a frame grabbed from the live camera.
    pub fn capture_frame(self, jpeg: &[u8]) -> Result<Self, CaptureError> {
        if !self.camera_on {
            return Err(CaptureError::CameraOff);
        }
        let image = ImageData::from_jpeg(jpeg).map_err(|_| CaptureError::EmptyFrame)?;
        Ok(Self {
            captured: Some(image),
            ..self
        })
    }

    /// Store an image picked from a file, regardless of camera state.
    #[must_use]
    pub fn load_file(self, image: ImageData) -> Self {
        Self {
            captured: Some(image),
            ..self
        }
    }

    /// Store an image given as a `data:` URL (a file reader result).
    pub fn load_data_url(self, url: &str) -> Result<Self, ImageError> {
        Ok(self.load_file(ImageData::parse_data_url(url)?))
    }

    /// Discard the captured image.
    #[must_use]
    pub fn retake(self) -> Self {
        Self {
            captured: None,
            ..self
        }
    }

    /// Mark the session busy and hand out the image to submit.
    pub fn begin_submit(self) -> Result<(Self, ImageData), CaptureError> {
        if self.busy {
            return Err(CaptureError::Busy);
        }
        let image = self.captured.clone().ok_or(CaptureError::NothingCaptured)?;
        Ok((Self { busy: true, ..self }, image))
    }

    /// Clear the busy flag once the submission settles, success or not.
    #[must_use]
    pub fn finish_submit(self) -> Self {
        Self {
            busy: false,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

    #[test]
    fn capture_requires_camera() {
        let err = CaptureSession::new().capture_frame(JPEG).unwrap_err();
        assert_eq!(err, CaptureError::CameraOff);
    }

    #[test]
    fn toggling_off_keeps_capture() {
        let session = CaptureSession::new()
            .toggle_camera()
            .capture_frame(JPEG)
            .unwrap()
            .toggle_camera();
        assert!(!session.camera_on);
        assert!(session.captured.is_some());
    }

    #[test]
    fn file_load_works_with_camera_off() {
        let session = CaptureSession::new()
            .load_data_url("data:image/jpeg;base64,/9j/4A==")
            .unwrap();
        assert!(session.captured.is_some());
    }

    #[test]
    fn submit_cycle() {
        let session = CaptureSession::new().toggle_camera().capture_frame(JPEG).unwrap();
        let (session, image) = session.begin_submit().unwrap();
        assert!(session.busy);
        assert_eq!(image.decode().unwrap(), JPEG);

        assert_eq!(session.clone().begin_submit().unwrap_err(), CaptureError::Busy);

        let session = session.finish_submit();
        assert!(!session.busy);
        assert!(session.captured.is_some());
    }

    #[test]
    fn empty_frame_keeps_previous_capture() {
        let session = CaptureSession::new().toggle_camera().capture_frame(JPEG).unwrap();
        let err = session.clone().capture_frame(&[]).unwrap_err();
        assert_eq!(err, CaptureError::EmptyFrame);
        assert_eq!(session.captured.unwrap().decode().unwrap(), JPEG);
    }

    #[test]
    fn submit_without_capture_fails() {
        let err = CaptureSession::new().begin_submit().unwrap_err();
        assert_eq!(err, CaptureError::NothingCaptured);
    }

    #[test]
    fn retake_clears_capture() {
        let session = CaptureSession::new()
            .toggle_camera()
            .capture_frame(JPEG)
            .unwrap()
            .retake();
        assert!(session.captured.is_none());
        assert!(session.camera_on);
    }
}
