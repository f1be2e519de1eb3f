//! Lens client struct and builder.

use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use lens_stream::{Render, assemble_with_timeout, document_stream};
use lens_types::{
    AnalysisRequest, Article, AudioClip, ClientError, Coordinates, DocumentEvent, Finish, ImageData,
    InspectionReport, Record, ReferralAttributes, SiteAssessment,
};
use tokio_util::sync::CancellationToken;

use crate::config::{Endpoint, LensConfig};
use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::{
    analysis_body, articles_body, audio_body, decode_response, inspection_body, referral_body,
    site_check_body,
};
use crate::streaming::{ByteStream, open_body};

/// Client for the lens collaborator endpoints.
///
/// Each endpoint is configured by URL. Calls to an endpoint with no URL fail
/// with [`ClientError::Config`]; the others keep working.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use lens_client::{Endpoint, LensClient};
///
/// let client = LensClient::new()
///     .endpoint(Endpoint::SiteCheck, "http://localhost:8080/site-check")
///     .request_timeout(Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
pub struct LensClient {
    /// Endpoint URLs.
    pub(crate) config: LensConfig,
    /// Timeout for each JSON request, and for the analysis response headers.
    pub(crate) request_timeout: Duration,
    /// Overall deadline for a streaming analysis.
    pub(crate) stream_timeout: Option<Duration>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl LensClient {
    /// Create a client with no endpoints configured and default timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(LensConfig::default())
    }

    /// Create a client from a loaded configuration.
    #[must_use]
    pub fn from_config(config: LensConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            stream_timeout: config.stream_timeout(),
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from `LENS_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        LensConfig::from_env().map(Self::from_config)
    }

    /// Set the URL of one endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint, url: impl Into<String>) -> Self {
        self.config.set_url(endpoint, url);
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Give streaming analyses an overall deadline.
    #[must_use]
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = Some(timeout);
        self
    }

    /// Use a preconfigured HTTP client (proxies, custom TLS roots).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The endpoint configuration.
    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    pub(crate) fn url(&self, endpoint: Endpoint) -> Result<&str, ClientError> {
        self.config
            .url(endpoint)
            .ok_or_else(|| ClientError::Config(format!("no URL configured for the {endpoint} endpoint ({})", endpoint.env_var())))
    }

    /// Stream an analysis, rendering the document after every change.
    ///
    /// Request and status errors are returned before any frame is read. Once
    /// streaming starts the outcome is always a [`Finish`]: transport
    /// failures, decode failures, and the stream deadline are reported in
    /// [`Finish::error`] alongside the partial document, and cancelling
    /// `cancel` finishes with [`FinishReason::Cancelled`](lens_types::FinishReason::Cancelled).
    pub async fn analyze_stream<R>(
        &self,
        request: &AnalysisRequest,
        renderer: &mut R,
        cancel: &CancellationToken,
    ) -> Result<Finish, ClientError>
    where
        R: Render + ?Sized,
    {
        let body = self.open_analysis(request).await?;
        Ok(assemble_with_timeout(body, renderer, cancel, self.stream_timeout).await)
    }

    /// Stream an analysis as [`DocumentEvent`]s instead of render calls.
    ///
    /// The stream timeout does not apply; drop the stream to stop reading.
    pub async fn analysis_events(
        &self,
        request: &AnalysisRequest,
    ) -> Result<BoxStream<'static, DocumentEvent>, ClientError> {
        let body = self.open_analysis(request).await?;
        Ok(document_stream(body).boxed())
    }

    async fn open_analysis(&self, request: &AnalysisRequest) -> Result<ByteStream, ClientError> {
        let url = self.url(Endpoint::Analysis)?;
        let body = analysis_body(request)?;

        tracing::debug!(url = %url, articles = request.articles.len(), "sending analysis request");

        let send = self
            .client
            .post(url)
            .header("accept", "text/event-stream")
            .json(&body)
            .send();
        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| ClientError::Timeout(self.request_timeout))?
            .map_err(|e| map_reqwest_error(e, self.request_timeout))?;

        open_body(response, self.request_timeout).await
    }

    /// Retrieve literature passages relevant to a description of events.
    ///
    /// `num_articles` defaults to [`DEFAULT_ARTICLE_COUNT`](lens_types::DEFAULT_ARTICLE_COUNT).
    pub async fn retrieve_articles(
        &self,
        events_text: &str,
        num_articles: Option<u32>,
    ) -> Result<Vec<Article>, ClientError> {
        let body = articles_body(events_text, num_articles)?;
        self.post_json(Endpoint::Articles, &body).await
    }

    /// Inspect an image against a background description.
    pub async fn inspect_image(&self, image: &ImageData, background: &str) -> Result<InspectionReport, ClientError> {
        let body = inspection_body(image, background)?;
        self.post_json(Endpoint::Inspection, &body).await
    }

    /// Judge from satellite imagery whether a site looks active.
    pub async fn check_site(&self, coordinates: Coordinates) -> Result<SiteAssessment, ClientError> {
        self.post_json(Endpoint::SiteCheck, &site_check_body(coordinates)).await
    }

    /// Synthesize speech for `text`.
    pub async fn synthesize_audio(&self, text: &str) -> Result<AudioClip, ClientError> {
        let body = audio_body(text)?;
        self.post_json(Endpoint::Audio, &body).await
    }

    /// Read patient attributes from a referral document image.
    pub async fn extract_referral(&self, image: &ImageData) -> Result<ReferralAttributes, ClientError> {
        self.post_json(Endpoint::Referral, &referral_body(image)).await
    }

    async fn post_json<T: Record>(&self, endpoint: Endpoint, body: &serde_json::Value) -> Result<T, ClientError> {
        let url = self.url(endpoint)?;

        tracing::debug!(url = %url, endpoint = %endpoint, "sending request");

        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.request_timeout))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, self.request_timeout))?;

        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "request failed");
            return Err(map_http_status(status, &response_text));
        }

        decode_response(&response_text)
    }
}

impl Default for LensClient {
    fn default() -> Self {
        Self::new()
    }
}
