//! Captured images, carried as base64 `data:` URLs.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// MIME type used for camera captures.
pub const JPEG_MIME: &str = "image/jpeg";

/// An image embedded as `data:<mime>;base64,<payload>`.
///
/// This is the form the front-ends submit to the inspection and referral
/// endpoints. The payload is checked to be valid base64 on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageData {
    mime: String,
    payload: String,
}

impl ImageData {
    /// Encode raw JPEG bytes.
    pub fn from_jpeg(bytes: &[u8]) -> Result<Self, ImageError> {
        Self::from_bytes(JPEG_MIME, bytes)
    }

    /// Encode raw bytes of the given MIME type.
    pub fn from_bytes(mime: impl Into<String>, bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok(Self {
            mime: mime.into(),
            payload: STANDARD.encode(bytes),
        })
    }

    /// Parse a `data:` URL such as `data:image/jpeg;base64,/9j/4AAQ...`.
    pub fn parse_data_url(url: &str) -> Result<Self, ImageError> {
        let rest = url.trim().strip_prefix("data:").ok_or(ImageError::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(ImageError::NotDataUrl)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(ImageError::NotBase64)?;
        if payload.is_empty() {
            return Err(ImageError::Empty);
        }
        STANDARD
            .decode(payload)
            .map_err(|e| ImageError::Base64(e.to_string()))?;
        Ok(Self {
            mime: mime.to_string(),
            payload: payload.to_string(),
        })
    }

    /// The MIME type from the URL header.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// The base64 payload without the `data:` header.
    pub fn base64_payload(&self) -> &str {
        &self.payload
    }

    /// Decode the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ImageError> {
        STANDARD
            .decode(&self.payload)
            .map_err(|e| ImageError::Base64(e.to_string()))
    }

    /// Render the full `data:` URL.
    pub fn to_data_url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}

impl FromStr for ImageData {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_data_url(s)
    }
}

impl TryFrom<String> for ImageData {
    type Error = ImageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_data_url(&value)
    }
}

impl From<ImageData> for String {
    fn from(image: ImageData) -> Self {
        image.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_bytes_round_trip_through_data_url() {
        let image = ImageData::from_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        let url = image.to_data_url();
        assert_eq!(url, "data:image/jpeg;base64,/9j/4A==");

        let parsed: ImageData = url.parse().unwrap();
        assert_eq!(parsed, image);
        assert_eq!(parsed.decode().unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn rejects_plain_base64() {
        assert_eq!(
            ImageData::parse_data_url("/9j/4A==").unwrap_err(),
            ImageError::NotDataUrl
        );
    }

    #[test]
    fn rejects_non_base64_data_url() {
        assert_eq!(
            ImageData::parse_data_url("data:text/plain,hello").unwrap_err(),
            ImageError::NotBase64
        );
    }

    #[test]
    fn rejects_corrupt_payload() {
        let err = ImageData::parse_data_url("data:image/png;base64,@@@").unwrap_err();
        assert!(matches!(err, ImageError::Base64(_)));
    }

    #[test]
    fn rejects_empty_capture() {
        assert_eq!(ImageData::from_jpeg(&[]).unwrap_err(), ImageError::Empty);
        assert_eq!(
            ImageData::parse_data_url("data:image/jpeg;base64,").unwrap_err(),
            ImageError::Empty
        );
    }

    #[test]
    fn serializes_as_data_url_string() {
        let image = ImageData::from_bytes("image/png", b"png").unwrap();
        let json = serde_json::to_string(&image).unwrap();
        assert_eq!(json, "\"data:image/png;base64,cG5n\"");
        let back: ImageData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mime(), "image/png");
    }
}
