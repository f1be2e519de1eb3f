//! Request and response records for the collaborator endpoints.
//!
//! One canonical schema per endpoint. Every response record implements
//! [`Record`], so the client can reject missing fields before serde sees them
//! and check ranges after.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::image::ImageData;
use crate::validate::{Record, Validate, require_non_empty, require_range};

// ─── Literature retrieval ────────────────────────────────────────────────────

/// Default number of passages requested from the retrieval endpoint.
pub const DEFAULT_ARTICLE_COUNT: u32 = 20;

/// A retrieved literature passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Accession name of the source document.
    #[serde(default)]
    pub name: String,
    /// PubMed identifier. Accepted as a string or a number.
    #[serde(deserialize_with = "string_or_number")]
    pub pmid: String,
    /// Passage text.
    pub content: String,
    /// Vector distance from the query. Accepted as a string or a number.
    #[serde(default, deserialize_with = "float_or_string")]
    pub distance: f64,
}

impl Article {
    /// Link to the article on PubMed.
    pub fn pubmed_url(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.pmid)
    }
}

impl Validate for Article {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("pmid", &self.pmid)
    }
}

impl Record for Vec<Article> {
    const REQUIRED_FIELDS: &'static [&'static str] = &[];
}

/// Body of the streaming analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The user's question.
    pub query: String,
    /// Passages the answer should cite.
    pub articles: Vec<Article>,
}

impl AnalysisRequest {
    /// Build a request from a query and its supporting passages.
    pub fn new(query: impl Into<String>, articles: Vec<Article>) -> Self {
        Self {
            query: query.into(),
            articles,
        }
    }
}

impl Validate for AnalysisRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("query", &self.query)?;
        if self.articles.is_empty() {
            return Err(ValidationError::invalid("articles", "must not be empty"));
        }
        Ok(())
    }
}

// ─── Image inspection ────────────────────────────────────────────────────────

/// Upper bound of the normalized bounding-box coordinate space.
pub const BOX_SCALE: i32 = 1000;

/// A region of an image as `[y_min, x_min, y_max, x_max]`, normalized to
/// `0..=1000` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBox(pub [i32; 4]);

impl BoundingBox {
    /// Scale the box to pixel coordinates `(x0, y0, x1, y1)` for an image of
    /// the given size.
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let [y0, x0, y1, x1] = self.0;
        let scale = |v: i32, size: u32| -> u32 {
            (i64::from(v.clamp(0, BOX_SCALE)) * i64::from(size) / i64::from(BOX_SCALE)) as u32
        };
        (
            scale(x0, width),
            scale(y0, height),
            scale(x1, width),
            scale(y1, height),
        )
    }
}

impl Validate for BoundingBox {
    fn validate(&self) -> Result<(), ValidationError> {
        let [y0, x0, y1, x1] = self.0;
        if self.0.iter().any(|v| !(0..=BOX_SCALE).contains(v)) {
            return Err(ValidationError::invalid(
                "box_2d",
                format!("coordinates must lie in 0..={BOX_SCALE}"),
            ));
        }
        if y0 > y1 || x0 > x1 {
            return Err(ValidationError::invalid("box_2d", "min corner exceeds max corner"));
        }
        Ok(())
    }
}

/// A potential regulatory citation found in an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Cited section number, e.g. `21 CFR 117.35(c)`.
    pub section: String,
    /// Text of the cited section.
    #[serde(default)]
    pub text: String,
    /// Why the citation applies to what is visible.
    pub reason: String,
    /// Region of the image the citation refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_2d: Option<BoundingBox>,
    /// Annotated copy of the image with the region highlighted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,
}

impl Validate for Citation {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("citations.section", &self.section)?;
        require_non_empty("citations.reason", &self.reason)?;
        self.box_2d.validate()
    }
}

/// Citations for one inspection image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    /// Every citation, in the order the endpoint returned them.
    pub citations: Vec<Citation>,
    /// Short summary of the citations; empty when there are none.
    #[serde(default)]
    pub summary: String,
}

impl Validate for InspectionReport {
    fn validate(&self) -> Result<(), ValidationError> {
        self.citations.validate()
    }
}

impl Record for InspectionReport {
    const REQUIRED_FIELDS: &'static [&'static str] = &["citations"];
}

// ─── Site pre-check ──────────────────────────────────────────────────────────

/// A latitude/longitude pair, written `"lat,lng"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        require_range("lat", lat, -90.0, 90.0)?;
        require_range("lng", lng, -180.0, 180.0)?;
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for Coordinates {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| ValidationError::invalid("coordinates", "expected \"lat,lng\""))?;
        let parse = |field: &str, v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| ValidationError::invalid(field, e.to_string()))
        };
        Self::new(parse("lat", lat)?, parse("lng", lng)?)
    }
}

/// Vehicle counts from the satellite view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleAnalysis {
    /// Number of vehicles detected.
    pub total_count: u32,
    /// Notes on vehicle placement.
    #[serde(default)]
    pub observations: Vec<String>,
}

/// Whether a site looks active, judged from a satellite image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAssessment {
    /// The endpoint's verdict.
    #[serde(rename = "isActive")]
    pub is_active: bool,
    /// Confidence in the verdict, `0.0..=1.0`.
    pub confidence: f64,
    /// Specific details observed in the image.
    #[serde(default)]
    pub observations: Vec<String>,
    /// Recommendation for inspection planning.
    pub recommendation: String,
    /// Vehicle counts, when the endpoint ran vehicle detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_analysis: Option<VehicleAnalysis>,
}

impl Validate for SiteAssessment {
    fn validate(&self) -> Result<(), ValidationError> {
        require_range("confidence", self.confidence, 0.0, 1.0)?;
        require_non_empty("recommendation", &self.recommendation)
    }
}

impl Record for SiteAssessment {
    const REQUIRED_FIELDS: &'static [&'static str] = &["isActive", "confidence", "recommendation"];
}

// ─── Audio synthesis ─────────────────────────────────────────────────────────

/// Synthesized speech, decoded from the endpoint's base64 `audio` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AudioWire")]
pub struct AudioClip {
    /// Raw audio bytes (LINEAR16, WAV container).
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct AudioWire {
    audio: String,
}

impl TryFrom<AudioWire> for AudioClip {
    type Error = String;

    fn try_from(wire: AudioWire) -> Result<Self, Self::Error> {
        STANDARD
            .decode(wire.audio.trim())
            .map(|bytes| Self { bytes })
            .map_err(|e| format!("audio is not valid base64: {e}"))
    }
}

impl AudioClip {
    /// Whether the bytes carry a RIFF/WAVE header.
    pub fn is_wav(&self) -> bool {
        self.bytes.len() >= 12 && &self.bytes[..4] == b"RIFF" && &self.bytes[8..12] == b"WAVE"
    }
}

impl Validate for AudioClip {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.bytes.is_empty() {
            return Err(ValidationError::invalid("audio", "must not be empty"));
        }
        Ok(())
    }
}

impl Record for AudioClip {
    const REQUIRED_FIELDS: &'static [&'static str] = &["audio"];
}

// ─── Referral extraction ─────────────────────────────────────────────────────

/// Patient attributes read from a referral document image.
///
/// Every field is optional; the endpoint omits what it cannot read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralAttributes {
    /// Patient name.
    #[serde(default)]
    pub name: Option<String>,
    /// Date of birth as printed on the document.
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// Date of the first procedure as printed on the document.
    #[serde(default)]
    pub date_of_first_procedure: Option<String>,
}

impl fmt::Display for ReferralAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_na = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A").to_string();
        write!(
            f,
            "Name: {}\nDate of birth: {}\nDate of first procedure: {}",
            or_na(&self.name),
            or_na(&self.date_of_birth),
            or_na(&self.date_of_first_procedure),
        )
    }
}

impl Validate for ReferralAttributes {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Record for ReferralAttributes {
    const REQUIRED_FIELDS: &'static [&'static str] = &[];
}

// ─── Lenient scalars ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Text(s) => s,
    })
}

fn float_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Scalar::deserialize(deserializer)? {
        Scalar::Int(n) => Ok(n as f64),
        Scalar::Float(n) => Ok(n),
        Scalar::Text(s) => s.trim().parse().map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::decode_record;
    use serde_json::json;

    #[test]
    fn article_accepts_numeric_pmid_and_string_distance() {
        let articles: Vec<Article> = decode_record(json!([
            {"name": "PMC1", "pmid": 12345678, "content": "fiber", "distance": "0.25"},
            {"name": "PMC2", "pmid": "87654321", "content": "salt", "distance": 0.5}
        ]))
        .unwrap();
        assert_eq!(articles[0].pmid, "12345678");
        assert_eq!(articles[0].distance, 0.25);
        assert_eq!(
            articles[1].pubmed_url(),
            "https://pubmed.ncbi.nlm.nih.gov/87654321/"
        );
    }

    #[test]
    fn analysis_request_requires_query_and_articles() {
        let article = Article {
            name: "PMC1".into(),
            pmid: "1".into(),
            content: "c".into(),
            distance: 0.0,
        };
        assert!(AnalysisRequest::new(" ", vec![article.clone()]).validate().is_err());
        assert!(AnalysisRequest::new("is salt bad?", vec![]).validate().is_err());
        assert!(AnalysisRequest::new("is salt bad?", vec![article]).validate().is_ok());
    }

    #[test]
    fn inspection_report_requires_citations() {
        let err = decode_record::<InspectionReport>(json!({"summary": "x"})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("citations".into()));
    }

    #[test]
    fn inspection_report_defaults_summary() {
        let report: InspectionReport = decode_record(json!({
            "citations": [{
                "section": "21 CFR 117.35",
                "text": "Sanitary operations",
                "reason": "Debris near the line",
                "box_2d": [100, 200, 300, 400]
            }]
        }))
        .unwrap();
        assert_eq!(report.summary, "");
        assert_eq!(report.citations[0].box_2d, Some(BoundingBox([100, 200, 300, 400])));
    }

    #[test]
    fn citation_box_out_of_range_is_rejected() {
        let err = decode_record::<InspectionReport>(json!({
            "citations": [{"section": "s", "reason": "r", "box_2d": [0, 0, 1200, 10]}]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field, .. } if field == "box_2d"));
    }

    #[test]
    fn bounding_box_scales_to_pixels() {
        let bbox = BoundingBox([100, 250, 500, 750]);
        assert_eq!(bbox.to_pixels(800, 600), (200, 60, 600, 300));
    }

    #[test]
    fn coordinates_parse_and_display() {
        let c: Coordinates = " 37.422 , -122.084 ".parse().unwrap();
        assert_eq!(c.lat(), 37.422);
        assert_eq!(c.to_string(), "37.422,-122.084");
        assert!("91,0".parse::<Coordinates>().is_err());
        assert!("12.5".parse::<Coordinates>().is_err());
        assert!("north,east".parse::<Coordinates>().is_err());
    }

    #[test]
    fn site_assessment_checks_confidence() {
        let err = decode_record::<SiteAssessment>(json!({
            "isActive": true,
            "confidence": 1.5,
            "recommendation": "schedule"
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field, .. } if field == "confidence"));
    }

    #[test]
    fn site_assessment_reads_vehicle_analysis() {
        let site: SiteAssessment = decode_record(json!({
            "isActive": true,
            "confidence": 0.8,
            "observations": ["fresh tire marks"],
            "recommendation": "proceed",
            "vehicle_analysis": {"total_count": 14}
        }))
        .unwrap();
        assert!(site.is_active);
        assert_eq!(site.vehicle_analysis.map(|v| v.total_count), Some(14));
    }

    #[test]
    fn audio_clip_decodes_base64() {
        let clip: AudioClip = decode_record(json!({"audio": "UklGRiQAAABXQVZF"})).unwrap();
        assert!(clip.is_wav());
    }

    #[test]
    fn audio_clip_rejects_bad_base64() {
        let err = decode_record::<AudioClip>(json!({"audio": "%%%"})).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn referral_display_falls_back_to_na() {
        let attrs = ReferralAttributes {
            name: Some("Jane Roe".into()),
            date_of_birth: None,
            date_of_first_procedure: Some(String::new()),
        };
        assert_eq!(
            attrs.to_string(),
            "Name: Jane Roe\nDate of birth: N/A\nDate of first procedure: N/A"
        );
    }
}
