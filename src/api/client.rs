use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use super::schema::parse_test_response;
use super::TestService;
use crate::config::Config;
use crate::error::{ExportFormat, QuizError, Result};
use crate::models::Test;

const CLIENT_AGENT: &str = concat!("textquiz/", env!("CARGO_PKG_VERSION"));
const GENERATION_FAILED: &str = "Test generation failed";
const FETCH_FAILED: &str = "Failed to load text from the page";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct FetchTextResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Number of questions and options the service produces for a text of the
/// given length (in characters).
pub fn suggested_shape(text_len: usize) -> (usize, usize) {
    if text_len < 500 {
        (3, 3)
    } else if text_len < 1500 {
        (5, 4)
    } else {
        (10, 5)
    }
}

/// Pulls the human readable message out of an error body: `{"detail": ...}`
/// when it is JSON, the raw text otherwise.
pub fn extract_error_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => {
                Some(detail.clone())
            }
            Some(serde_json::Value::Null) | None => None,
            Some(serde_json::Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        },
        Err(_) => Some(trimmed.to_string()),
    }
}

/// HTTP implementation of [`TestService`] talking to the generation backend.
#[derive(Debug, Clone)]
pub struct HttpTestService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTestService {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QuizError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reads the body of a failed response and returns the service's message.
    async fn failure_detail(res: reqwest::Response) -> Option<String> {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        let detail = extract_error_detail(&body);
        error!(%status, body_len = body.len(), "Service returned an error");
        detail
    }
}

#[async_trait]
impl TestService for HttpTestService {
    #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
    async fn generate_test(&self, text: &str) -> Result<Test> {
        let start = std::time::Instant::now();
        let res = self
            .client
            .post(self.endpoint("/api/generate-test"))
            .header(USER_AGENT, CLIENT_AGENT)
            .header(CONTENT_TYPE, "application/json")
            .json(&GenerateRequest { text })
            .send()
            .await
            .map_err(|e| QuizError::GenerationFailed(format!("{}: {}", GENERATION_FAILED, e)))?;

        if !res.status().is_success() {
            let detail = Self::failure_detail(res).await;
            return Err(QuizError::GenerationFailed(
                detail.unwrap_or_else(|| GENERATION_FAILED.to_string()),
            ));
        }

        let body = res
            .text()
            .await
            .map_err(|e| QuizError::GenerationFailed(format!("{}: {}", GENERATION_FAILED, e)))?;
        let test = parse_test_response(&body)?;
        info!(
            elapsed = ?start.elapsed(),
            questions = test.questions.len(),
            "Test generated"
        );
        Ok(test)
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch_url_text(&self, url: &str) -> Result<String> {
        let res = self
            .client
            .get(self.endpoint("/api/fetch-text"))
            .header(USER_AGENT, CLIENT_AGENT)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| QuizError::RemoteFetchFailed(format!("{}: {}", FETCH_FAILED, e)))?;

        if !res.status().is_success() {
            let detail = Self::failure_detail(res).await;
            return Err(QuizError::RemoteFetchFailed(
                detail.unwrap_or_else(|| FETCH_FAILED.to_string()),
            ));
        }

        let body: FetchTextResponse = res
            .json()
            .await
            .map_err(|e| QuizError::RemoteFetchFailed(format!("{}: {}", FETCH_FAILED, e)))?;
        let text = body.text.unwrap_or_default();
        info!(text_len = text.len(), "Page text fetched");
        Ok(text)
    }

    #[instrument(level = "info", skip(self, test))]
    async fn render_document(&self, test: &Test, format: ExportFormat) -> Result<Vec<u8>> {
        let path = match format {
            ExportFormat::Pdf => "/api/generate-pdf",
            ExportFormat::Word => "/api/generate-word",
        };
        let export_failed = |reason: String| QuizError::ExportFailed { format, reason };

        let res = self
            .client
            .post(self.endpoint(path))
            .header(USER_AGENT, CLIENT_AGENT)
            .json(test)
            .send()
            .await
            .map_err(|e| export_failed(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let detail = Self::failure_detail(res).await;
            return Err(export_failed(
                detail.unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }

        let bytes = res.bytes().await.map_err(|e| export_failed(e.to_string()))?;
        info!(bytes = bytes.len(), "Document rendered");
        Ok(bytes.to_vec())
    }
}
