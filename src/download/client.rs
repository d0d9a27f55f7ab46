//! HTTP client for fetching poem PDFs and the index page.
//!
//! Poem PDFs live at a fixed, id-addressed location on the origin:
//! `{base}/typographia/textos/arquivopessoa-{id}.pdf`. The client fetches
//! the whole payload into memory (poem PDFs are a few hundred KB at most)
//! and leaves retrying to the orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use tracing::{debug, instrument};

use super::constants::{BASE_URL, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;

/// Browser-like User-Agent; the origin rejects obviously scripted clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches a single poem's raw PDF bytes by id.
///
/// This is the seam between the orchestrator and the transport: production
/// code uses [`HttpClient`], tests substitute a scripted double. The
/// implementation does not need to retry internally; the orchestrator's
/// retry loop is the only defense against transient failures.
#[async_trait]
pub trait PoemFetcher: Send + Sync {
    /// Fetches the PDF payload for `poem_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] on any transport failure; the caller
    /// treats every failure as retryable.
    async fn fetch(&self, poem_id: u32) -> Result<Vec<u8>, DownloadError>;
}

/// HTTP client for the Arquivo Pessoa origin.
///
/// Created once and reused for every request to take advantage of
/// connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client pointed at the production origin.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Creates a client pointed at an alternate origin (used by tests).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/pdf"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("pt-BR,pt;q=0.9"),
        );
        if let Ok(referer) = HeaderValue::from_str(&base_url) {
            headers.insert(REFERER, referer);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .expect("failed to build HTTP client with static configuration");

        Self { client, base_url }
    }

    /// Returns the PDF URL for a poem id.
    #[must_use]
    pub fn pdf_url(&self, poem_id: u32) -> String {
        format!(
            "{}/typographia/textos/arquivopessoa-{poem_id}.pdf",
            self.base_url
        )
    }

    /// Returns the configured origin base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches a page as text (used for the category index).
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] on transport failure or a non-success
    /// HTTP status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.send(url).await?;
        response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl PoemFetcher for HttpClient {
    #[instrument(skip(self))]
    async fn fetch(&self, poem_id: u32) -> Result<Vec<u8>, DownloadError> {
        let url = self.pdf_url(poem_id);
        let response = self.send(&url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(&url, e))?;

        debug!(poem_id, bytes = bytes.len(), "fetch complete");
        Ok(bytes.to_vec())
    }
}
