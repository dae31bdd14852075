use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crosslens_common::{AppConfig, ArticleExtraction, CrossLensError, Result};

use super::{ensure_http, extraction_from_html, ArticleExtractor};

/// Renders pages with headless Chromium (`--dump-dom`), then runs Readability
/// over the DOM.
///
/// Each browser process is heavy, so a semaphore caps how many run at once.
/// The permit is held only while the browser runs.
pub struct ChromeExtractor {
    chrome_bin: String,
    timeout: Duration,
    semaphore: Semaphore,
}

impl ChromeExtractor {
    pub fn new(chrome_bin: impl Into<String>, timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            chrome_bin: chrome_bin.into(),
            timeout,
            semaphore: Semaphore::new(max_concurrent.max(1)),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.chrome_bin,
            config.extraction_timeout,
            config.max_concurrent_browsers,
        )
    }

    /// Launch the browser and return the rendered DOM. The child process is
    /// killed if the timeout fires or the future is dropped.
    async fn render(&self, url: &str) -> Result<Vec<u8>> {
        let profile = tempfile::tempdir().map_err(|e| {
            CrossLensError::Extraction(format!("Failed to create browser profile dir: {e}"))
        })?;

        let result = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&self.chrome_bin)
                .args([
                    "--headless",
                    "--no-sandbox",
                    "--disable-gpu",
                    "--disable-dev-shm-usage",
                    &format!("--user-data-dir={}", profile.path().display()),
                    "--dump-dom",
                    url,
                ])
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Err(_) => Err(CrossLensError::Extraction(format!(
                "Timeout while loading article after {} ms",
                self.timeout.as_millis()
            ))),
            Ok(Err(e)) => Err(CrossLensError::Extraction(format!(
                "Failed to launch browser {}: {e}",
                self.chrome_bin
            ))),
            Ok(Ok(output)) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(url, status = %output.status, stderr = %stderr, "Browser exited with error");
                Err(CrossLensError::Extraction(format!(
                    "Browser exited with {}",
                    output.status
                )))
            }
            Ok(Ok(output)) if output.stdout.is_empty() => Err(CrossLensError::Extraction(
                "Browser returned an empty page".to_string(),
            )),
            Ok(Ok(output)) => Ok(output.stdout),
        }
    }
}

#[async_trait]
impl ArticleExtractor for ChromeExtractor {
    async fn extract(&self, url: &str) -> Result<ArticleExtraction> {
        let parsed = ensure_http(url)?;

        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| CrossLensError::Extraction("Browser pool closed".to_string()))?;
        let html = self.render(url).await;
        drop(permit);

        let extraction = extraction_from_html(&html?, &parsed)?;
        info!(url, extractor = "chrome", bytes = extraction.text.len(), "Article extracted");
        Ok(extraction)
    }
}
