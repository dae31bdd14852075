use std::time::Duration;

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, BrowserlessError};
use tracing::info;

use crosslens_common::{ArticleExtraction, CrossLensError, Result};

use super::{ensure_http, extraction_from_html, ArticleExtractor};

/// Renders pages through a remote Browserless instance, then runs
/// Readability over the returned HTML.
pub struct BrowserlessExtractor {
    client: BrowserlessClient,
}

impl BrowserlessExtractor {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout: Duration,
    ) -> browserless_client::Result<Self> {
        Ok(Self {
            client: BrowserlessClient::new(base_url, token, timeout)?,
        })
    }
}

#[async_trait]
impl ArticleExtractor for BrowserlessExtractor {
    async fn extract(&self, url: &str) -> Result<ArticleExtraction> {
        let parsed = ensure_http(url)?;

        let html = self.client.content(url).await.map_err(|e| match e {
            BrowserlessError::Timeout(ms) => {
                CrossLensError::Extraction(format!("Timeout while loading article after {ms} ms"))
            }
            other => CrossLensError::Extraction(format!("Failed to load article content: {other}")),
        })?;

        let extraction = extraction_from_html(html.as_bytes(), &parsed)?;
        info!(url, extractor = "browserless", bytes = extraction.text.len(), "Article extracted");
        Ok(extraction)
    }
}
