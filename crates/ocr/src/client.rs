//! HTTP client for the OCR recognition endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-request timeout. Recognition of a receipt photo routinely
/// takes several seconds.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Text extraction from a receipt image.
///
/// Behind a trait so handlers and tests can substitute implementations;
/// the production implementation is [`HttpOcrClient`].
#[async_trait::async_trait]
pub trait OcrClient: Send + Sync {
    /// Extract plain text from a base64-encoded image.
    ///
    /// `language` is a recognition hint (e.g. `"fra"`), not a guarantee
    /// about the returned text.
    async fn extract_text(&self, image_base64: &str, language: &str) -> Result<String, OcrError>;
}

/// Client for an HTTP OCR service exposing `POST {base_url}/v1/recognize`.
pub struct HttpOcrClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    image: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    text: String,
}

impl HttpOcrClient {
    /// Create a client targeting an OCR service.
    ///
    /// * `base_url` - HTTP base URL, e.g. `http://localhost:8600`.
    pub fn new(base_url: String) -> Result<Self, OcrError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| OcrError::Connection(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { base_url, http })
    }

    /// HTTP base URL of the OCR service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl OcrClient for HttpOcrClient {
    async fn extract_text(&self, image_base64: &str, language: &str) -> Result<String, OcrError> {
        let url = format!("{}/v1/recognize", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&RecognizeRequest {
                image: image_base64,
                language,
            })
            .send()
            .await
            .map_err(|e| {
                OcrError::Connection(format!("Failed to reach OCR service at {url}: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(OcrError::Service(format!(
                "OCR service returned {}",
                response.status()
            )));
        }

        let body: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Service(format!("Malformed OCR response: {e}")))?;

        tracing::debug!(
            language,
            text_len = body.text.len(),
            "OCR extraction complete"
        );

        Ok(body.text)
    }
}

/// Errors from the OCR service.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    /// The service could not be reached (network, timeout, TLS).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The service answered but recognition failed.
    #[error("Service error: {0}")]
    Service(String),
}
