//! Request bodies and response decoding for the JSON endpoints.
//!
//! Requests are built from typed arguments and checked before they are sent.
//! Responses go through [`decode_response`], which turns an `{"error": ...}`
//! body into [`ClientError::Server`] and everything else into a validated
//! [`Record`].

use lens_types::{
    AnalysisRequest, ClientError, Coordinates, DEFAULT_ARTICLE_COUNT, ImageData, Record, Validate,
    ValidationError, decode_record,
};
use serde_json::{Value, json};

use crate::error::error_in_value;

/// Body for the streaming analysis endpoint.
pub fn analysis_body(request: &AnalysisRequest) -> Result<Value, ClientError> {
    request.validate().map_err(invalid_request)?;
    serde_json::to_value(request).map_err(|e| ClientError::InvalidRequest(e.to_string()))
}

/// Body for the literature retrieval endpoint.
pub fn articles_body(events_text: &str, num_articles: Option<u32>) -> Result<Value, ClientError> {
    if events_text.trim().is_empty() {
        return Err(ClientError::InvalidRequest("events_text must not be empty".into()));
    }
    let num_articles = num_articles.unwrap_or(DEFAULT_ARTICLE_COUNT);
    if num_articles == 0 {
        return Err(ClientError::InvalidRequest("num_articles must be at least 1".into()));
    }
    Ok(json!({
        "events_text": events_text,
        "num_articles": num_articles,
    }))
}

/// Body for the image inspection endpoint.
pub fn inspection_body(image: &ImageData, background: &str) -> Result<Value, ClientError> {
    if background.trim().is_empty() {
        return Err(ClientError::InvalidRequest("background must not be empty".into()));
    }
    Ok(json!({
        "image": image.to_data_url(),
        "background": background,
    }))
}

/// Body for the site pre-check endpoint.
pub fn site_check_body(coordinates: Coordinates) -> Value {
    json!({ "coordinates": coordinates.to_string() })
}

/// Body for the speech synthesis endpoint.
pub fn audio_body(text: &str) -> Result<Value, ClientError> {
    if text.trim().is_empty() {
        return Err(ClientError::InvalidRequest("text must not be empty".into()));
    }
    Ok(json!({ "text": text }))
}

/// Body for the referral extraction endpoint.
pub fn referral_body(image: &ImageData) -> Value {
    json!({ "image": image.to_data_url() })
}

/// Decode a successful response body into a validated record.
pub fn decode_response<T: Record>(body: &str) -> Result<T, ClientError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ValidationError::Malformed(format!("invalid JSON response: {e}")))?;
    if let Some(message) = error_in_value(&value) {
        return Err(ClientError::Server(message));
    }
    Ok(decode_record(value)?)
}

fn invalid_request(err: ValidationError) -> ClientError {
    ClientError::InvalidRequest(err.to_string())
}

#[cfg(test)]
mod tests {
    use lens_types::{Article, AudioClip, InspectionReport, ReferralAttributes, SiteAssessment};

    use super::*;

    fn article(pmid: &str) -> Article {
        Article {
            name: "PMC1".into(),
            pmid: pmid.into(),
            content: "Dietary fiber and cardiovascular risk.".into(),
            distance: 0.12,
        }
    }

    #[test]
    fn analysis_body_has_query_and_articles() {
        let body = analysis_body(&AnalysisRequest::new("Is fiber good?", vec![article("123")])).unwrap();
        assert_eq!(body["query"], "Is fiber good?");
        assert_eq!(body["articles"][0]["pmid"], "123");
        assert_eq!(body["articles"][0]["content"], "Dietary fiber and cardiovascular risk.");
    }

    #[test]
    fn analysis_body_rejects_empty_query() {
        let err = analysis_body(&AnalysisRequest::new("  ", vec![article("123")])).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(ref m) if m.contains("query")));
    }

    #[test]
    fn articles_body_defaults_count() {
        let body = articles_body("Had oatmeal.", None).unwrap();
        assert_eq!(body, json!({ "events_text": "Had oatmeal.", "num_articles": 20 }));
        assert_eq!(articles_body("x", Some(5)).unwrap()["num_articles"], 5);
        assert!(articles_body("", None).is_err());
        assert!(articles_body("x", Some(0)).is_err());
    }

    #[test]
    fn inspection_body_sends_data_url() {
        let image = ImageData::from_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        let body = inspection_body(&image, "Routine inspection").unwrap();
        assert_eq!(body["image"], "data:image/jpeg;base64,/9j/4A==");
        assert_eq!(body["background"], "Routine inspection");
        assert!(inspection_body(&image, "").is_err());
    }

    #[test]
    fn site_check_body_formats_coordinates() {
        let body = site_check_body(Coordinates::new(37.422, -122.084).unwrap());
        assert_eq!(body, json!({ "coordinates": "37.422,-122.084" }));
    }

    #[test]
    fn audio_and_referral_bodies() {
        assert_eq!(audio_body("Hello").unwrap(), json!({ "text": "Hello" }));
        assert!(matches!(audio_body(" "), Err(ClientError::InvalidRequest(_))));
        let image = ImageData::from_jpeg(&[1, 2, 3]).unwrap();
        assert_eq!(referral_body(&image), json!({ "image": "data:image/jpeg;base64,AQID" }));
    }

    #[test]
    fn error_body_is_server_error() {
        let err = decode_response::<SiteAssessment>(r#"{"error": "Failed to analyze image"}"#).unwrap_err();
        assert!(matches!(err, ClientError::Server(ref m) if m == "Failed to analyze image"));
    }

    #[test]
    fn missing_field_is_validation_error() {
        let err = decode_response::<SiteAssessment>(r#"{"confidence": 0.9, "recommendation": "Go"}"#).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::MissingField(ref f)) if f == "isActive"
        ));
    }

    #[test]
    fn out_of_range_is_validation_error() {
        let body = r#"{"isActive": true, "confidence": 1.5, "recommendation": "Go"}"#;
        let err = decode_response::<SiteAssessment>(body).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::InvalidField { .. })));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = decode_response::<InspectionReport>("<html>502</html>").unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::Malformed(_))));
    }

    #[test]
    fn decodes_each_record() {
        let site: SiteAssessment = decode_response(
            r#"{"isActive": false, "confidence": 0.4, "observations": [], "recommendation": "Visit"}"#,
        )
        .unwrap();
        assert!(!site.is_active);

        let clip: AudioClip = decode_response(r#"{"audio": "UklGRgAAAABXQVZF"}"#).unwrap();
        assert!(clip.is_wav());

        let referral: ReferralAttributes = decode_response(r#"{"name": "Jane Doe"}"#).unwrap();
        assert_eq!(referral.name.as_deref(), Some("Jane Doe"));

        let articles: Vec<Article> =
            decode_response(r#"[{"name": "PMC1", "pmid": 123, "content": "c", "distance": "0.5"}]"#).unwrap();
        assert_eq!(articles[0].pmid, "123");
        assert_eq!(articles[0].distance, 0.5);
    }
}
