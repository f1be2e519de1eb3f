//! Endpoint URLs and timeouts.

use std::fmt;
use std::time::Duration;

use lens_types::ClientError;
use serde::{Deserialize, Serialize};

/// Default per-request timeout for the JSON endpoints, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// The collaborator endpoints the client can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Streaming analysis (`data:` frames).
    Analysis,
    /// Literature retrieval.
    Articles,
    /// Image inspection with citations.
    Inspection,
    /// Satellite site pre-check.
    SiteCheck,
    /// Speech synthesis.
    Audio,
    /// Referral document extraction.
    Referral,
}

impl Endpoint {
    /// Every endpoint, in a fixed order.
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Analysis,
        Endpoint::Articles,
        Endpoint::Inspection,
        Endpoint::SiteCheck,
        Endpoint::Audio,
        Endpoint::Referral,
    ];

    /// Environment variable holding this endpoint's URL.
    pub fn env_var(self) -> &'static str {
        match self {
            Endpoint::Analysis => "LENS_ANALYSIS_URL",
            Endpoint::Articles => "LENS_ARTICLES_URL",
            Endpoint::Inspection => "LENS_INSPECTION_URL",
            Endpoint::SiteCheck => "LENS_SITE_CHECK_URL",
            Endpoint::Audio => "LENS_AUDIO_URL",
            Endpoint::Referral => "LENS_REFERRAL_URL",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Analysis => "analysis",
            Endpoint::Articles => "articles",
            Endpoint::Inspection => "inspection",
            Endpoint::SiteCheck => "site check",
            Endpoint::Audio => "audio",
            Endpoint::Referral => "referral",
        };
        f.write_str(name)
    }
}

/// Client configuration.
///
/// Endpoint URLs are optional: a missing URL only fails the call that needs
/// it, with [`ClientError::Config`].
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use lens_client::{Endpoint, LensConfig};
///
/// let config = LensConfig::from_json(r#"{"audio_url": "http://localhost:8080/audio"}"#).unwrap();
/// assert_eq!(config.url(Endpoint::Audio), Some("http://localhost:8080/audio"));
/// assert_eq!(config.url(Endpoint::Analysis), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Streaming analysis endpoint.
    pub analysis_url: Option<String>,
    /// Literature retrieval endpoint.
    pub articles_url: Option<String>,
    /// Image inspection endpoint.
    pub inspection_url: Option<String>,
    /// Site pre-check endpoint.
    pub site_check_url: Option<String>,
    /// Speech synthesis endpoint.
    pub audio_url: Option<String>,
    /// Referral extraction endpoint.
    pub referral_url: Option<String>,
    /// Timeout for each JSON request, in seconds.
    pub request_timeout_secs: u64,
    /// Overall deadline for a streaming analysis, in seconds. `None` waits
    /// until the server closes the stream.
    pub stream_timeout_secs: Option<u64>,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            analysis_url: None,
            articles_url: None,
            inspection_url: None,
            site_check_url: None,
            audio_url: None,
            referral_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            stream_timeout_secs: None,
        }
    }
}

impl LensConfig {
    /// Read configuration from `LENS_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for endpoint in Endpoint::ALL {
            if let Some(url) = lookup(endpoint.env_var()).filter(|u| !u.trim().is_empty()) {
                config.set_url(endpoint, url.trim());
            }
        }
        if let Some(secs) = lookup("LENS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_secs("LENS_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("LENS_STREAM_TIMEOUT_SECS") {
            config.stream_timeout_secs = Some(parse_secs("LENS_STREAM_TIMEOUT_SECS", &secs)?);
        }
        Ok(config)
    }

    /// Parse configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|e| ClientError::Config(format!("invalid config: {e}")))
    }

    /// URL configured for `endpoint`, if any.
    pub fn url(&self, endpoint: Endpoint) -> Option<&str> {
        let url = match endpoint {
            Endpoint::Analysis => &self.analysis_url,
            Endpoint::Articles => &self.articles_url,
            Endpoint::Inspection => &self.inspection_url,
            Endpoint::SiteCheck => &self.site_check_url,
            Endpoint::Audio => &self.audio_url,
            Endpoint::Referral => &self.referral_url,
        };
        url.as_deref()
    }

    /// Set the URL for `endpoint`.
    pub fn set_url(&mut self, endpoint: Endpoint, url: impl Into<String>) {
        let slot = match endpoint {
            Endpoint::Analysis => &mut self.analysis_url,
            Endpoint::Articles => &mut self.articles_url,
            Endpoint::Inspection => &mut self.inspection_url,
            Endpoint::SiteCheck => &mut self.site_check_url,
            Endpoint::Audio => &mut self.audio_url,
            Endpoint::Referral => &mut self.referral_url,
        };
        *slot = Some(url.into());
    }

    /// Per-request timeout for the JSON endpoints.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Overall deadline for a streaming analysis.
    pub fn stream_timeout(&self) -> Option<Duration> {
        self.stream_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_secs(var: &str, value: &str) -> Result<u64, ClientError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|e| ClientError::Config(format!("{var}: {e}")))?;
    if secs == 0 {
        return Err(ClientError::Config(format!("{var}: must be at least 1")));
    }
    Ok(secs)
}
