mod client;
mod schema;
pub(crate) mod types;

pub use schema::{strict_schema, NamedSchema};

use crate::error::Result;

use client::OpenAiClient;

// =============================================================================
// OpenAi Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key, self.http.clone());
        match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        }
    }

    /// Run a chat completion constrained to `schema` and return the JSON text
    /// the model produced (code fences stripped, not yet parsed).
    pub async fn structured_output(
        &self,
        system: &str,
        user: &str,
        schema: &NamedSchema,
    ) -> Result<String> {
        let request = types::StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                types::WireMessage::system(system),
                types::WireMessage::user(user),
            ],
            temperature: types::accepts_temperature(&self.model).then_some(0.0),
            response_format: types::ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: types::JsonSchemaFormat {
                    name: schema.name.clone(),
                    strict: true,
                    schema: schema.schema.clone(),
                },
            },
        };

        let content = self.client().structured_output(&request).await?;
        Ok(strip_code_blocks(&content).to_string())
    }
}

/// Some models wrap JSON in markdown fences even under `json_schema`.
fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_endpoint() {
        let ai = OpenAi::new("sk-test", "o4-mini");
        assert_eq!(ai.model(), "o4-mini");
        assert_eq!(ai.api_key, "sk-test");
        assert!(ai.base_url.is_none());
    }

    #[test]
    fn with_base_url_overrides_endpoint() {
        let ai = OpenAi::new("sk-test", "gpt-4o").with_base_url("https://proxy.local/v1");
        assert_eq!(ai.base_url.as_deref(), Some("https://proxy.local/v1"));
    }

    #[test]
    fn strips_fenced_json() {
        assert_eq!(strip_code_blocks("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  {}  "), "{}");
    }
}
