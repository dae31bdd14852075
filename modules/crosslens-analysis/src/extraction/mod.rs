mod browserless;
mod chrome;

pub use browserless::BrowserlessExtractor;
pub use chrome::ChromeExtractor;

use std::sync::Arc;

use async_trait::async_trait;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::info;

use crosslens_common::{AppConfig, ArticleExtraction, CrossLensError, Result};

// --- ArticleExtractor trait ---

/// Retrieves the readable body of an article.
///
/// Every failure, timeouts included, is reported as
/// `CrossLensError::Extraction`, which callers treat as recoverable. A
/// successful extraction always carries non-empty text.
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ArticleExtraction>;
}

/// Pick the renderer from configuration: Browserless when a URL is set,
/// local headless Chromium otherwise.
pub fn extractor_from_config(config: &AppConfig) -> anyhow::Result<Arc<dyn ArticleExtractor>> {
    match config.browserless_url {
        Some(ref base_url) => {
            info!(base_url = %base_url, "Using Browserless article extraction");
            Ok(Arc::new(BrowserlessExtractor::new(
                base_url,
                config.browserless_token.as_deref(),
                config.extraction_timeout,
            )?))
        }
        None => {
            info!(chrome_bin = %config.chrome_bin, "Using headless Chromium article extraction");
            Ok(Arc::new(ChromeExtractor::from_config(config)))
        }
    }
}

// --- Shared helpers ---

/// Only http(s) URLs are handed to a browser.
pub(crate) fn ensure_http(url: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(url)
        .map_err(|e| CrossLensError::Extraction(format!("Invalid article URL {url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CrossLensError::Extraction(format!(
            "Only http/https URLs are allowed, got: {other}"
        ))),
    }
}

/// Isolate the main article body with Readability and strip markup.
pub(crate) fn readable_text(html: &[u8], url: Option<&url::Url>) -> String {
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Text,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url,
        content: html,
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}

/// Turn rendered markup into an extraction, or fail when no body survives.
pub(crate) fn extraction_from_html(html: &[u8], url: &url::Url) -> Result<ArticleExtraction> {
    let text = readable_text(html, Some(url));
    let text = text.trim();
    if text.is_empty() {
        return Err(CrossLensError::Extraction(
            "Article body could not be extracted".to_string(),
        ));
    }
    Ok(ArticleExtraction::complete(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        for url in ["ftp://example.com/a", "file:///etc/passwd", "javascript:alert(1)"] {
            assert!(matches!(ensure_http(url), Err(CrossLensError::Extraction(_))));
        }
    }

    #[test]
    fn rejects_unparseable_url() {
        assert!(matches!(ensure_http("not a url"), Err(CrossLensError::Extraction(_))));
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(ensure_http("https://www.nytimes.com/article").is_ok());
        assert!(ensure_http("http://example.com").is_ok());
    }

    #[test]
    fn empty_markup_is_extraction_failure() {
        let url = url::Url::parse("https://example.com/a").unwrap();
        let err = extraction_from_html(b"<html><body></body></html>", &url).unwrap_err();
        assert!(err.is_extraction());
    }

    #[test]
    fn article_markup_yields_plain_text() {
        let url = url::Url::parse("https://example.com/summit").unwrap();
        let html = br#"<html><head><title>Summit</title></head><body>
            <article>
              <h1>Leaders meet in Alaska</h1>
              <p>The two presidents met on Friday to discuss a ceasefire framework, according to officials familiar with the talks.</p>
              <p>Negotiators said a second round could follow within weeks if both sides agree on the terms of a temporary truce.</p>
              <p>European governments, which were not represented at the meeting, asked to be briefed on any arrangement that would affect security guarantees on the continent.</p>
              <p>Analysts cautioned that previous rounds of talks had produced statements of intent rather than binding commitments, and that the details of any framework remain unclear.</p>
              <p>A joint statement is expected later in the day, while both delegations were scheduled to leave the venue before the evening press briefing.</p>
            </article></body></html>"#;

        let extraction = extraction_from_html(html, &url).unwrap();
        assert!(extraction.text.contains("ceasefire framework"));
        assert!(!extraction.text.contains("<p>"));
        assert!(!extraction.partial);
    }
}
