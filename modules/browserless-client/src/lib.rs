pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use tracing::debug;

/// Slack on top of the navigation timeout before the HTTP call itself gives up.
const REQUEST_GRACE: Duration = Duration::from_secs(5);

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout + REQUEST_GRACE)
            .build()
            .map_err(|e| BrowserlessError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            timeout,
        })
    }

    /// POST to `/content`, with the token as an encoded query parameter.
    fn content_request(&self) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}/content", self.base_url));
        match self.token {
            Some(ref token) => request.query(&[("token", token)]),
            None => request,
        }
    }

    /// Render `url` remotely and return the page HTML once the DOM is loaded.
    pub async fn content(&self, url: &str) -> Result<String> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let body = serde_json::json!({
            "url": url,
            "gotoOptions": {
                "waitUntil": "domcontentloaded",
                "timeout": timeout_ms,
            },
        });

        debug!(url, timeout_ms, "Browserless content request");

        let resp = self
            .content_request()
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(e, timeout_ms))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.text().await.map_err(|e| classify(e, timeout_ms))
    }
}

fn classify(err: reqwest::Error, timeout_ms: u64) -> BrowserlessError {
    if err.is_timeout() {
        BrowserlessError::Timeout(timeout_ms)
    } else {
        BrowserlessError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_url(client: &BrowserlessClient) -> String {
        client.content_request().build().unwrap().url().to_string()
    }

    #[test]
    fn request_appends_token() {
        let client =
            BrowserlessClient::new("https://chrome.example/", Some("abc"), Duration::from_secs(30))
                .unwrap();
        assert_eq!(request_url(&client), "https://chrome.example/content?token=abc");
    }

    #[test]
    fn token_is_url_encoded() {
        let client = BrowserlessClient::new(
            "https://chrome.example",
            Some("a&b=c d/+"),
            Duration::from_secs(30),
        )
        .unwrap();
        let request = client.content_request().build().unwrap();

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![("token".to_string(), "a&b=c d/+".to_string())]);
        assert!(!request.url().as_str().contains("a&b"));
    }

    #[test]
    fn request_without_token() {
        let client =
            BrowserlessClient::new("http://localhost:3000", None, Duration::from_secs(5)).unwrap();
        assert_eq!(request_url(&client), "http://localhost:3000/content");
    }
}
