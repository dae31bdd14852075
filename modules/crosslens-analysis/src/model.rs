use ai_client::{AiError, NamedSchema, OpenAi};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crosslens_common::{AppConfig, CrossLensError, Result};

/// A generative model constrained to answer with a JSON object matching a
/// schema.
///
/// Implementations report every failure (misconfiguration, transport, parse)
/// as `CrossLensError::Service`. Callers must still validate the object: a
/// model can violate its schema.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    async fn generate(
        &self,
        instruction: &str,
        input: &str,
        schema: &NamedSchema,
    ) -> Result<Map<String, Value>>;
}

/// `StructuredModel` backed by OpenAI chat completions.
pub struct OpenAiModel {
    agent: Option<OpenAi>,
}

impl OpenAiModel {
    pub fn new(agent: OpenAi) -> Self {
        Self { agent: Some(agent) }
    }

    /// Without an API key every call fails with a service error; the server
    /// still starts.
    pub fn from_config(config: &AppConfig) -> Self {
        let agent = config.openai_api_key.as_ref().map(|key| {
            let agent = OpenAi::new(key, &config.openai_model);
            match config.openai_base_url {
                Some(ref url) => agent.with_base_url(url),
                None => agent,
            }
        });
        Self { agent }
    }
}

#[async_trait]
impl StructuredModel for OpenAiModel {
    async fn generate(
        &self,
        instruction: &str,
        input: &str,
        schema: &NamedSchema,
    ) -> Result<Map<String, Value>> {
        let agent = self
            .agent
            .as_ref()
            .ok_or_else(|| CrossLensError::Service("OpenAI API key not configured".to_string()))?;

        debug!(model = agent.model(), schema = %schema.name, input_bytes = input.len(), "Invoking model");

        let raw = agent
            .structured_output(instruction, input, schema)
            .await
            .map_err(|e| match e {
                AiError::Parse(reason) => {
                    CrossLensError::Service(format!("Unable to parse model response: {reason}"))
                }
                other => CrossLensError::Service(format!("Model request failed: {other}")),
            })?;

        parse_object(&raw)
    }
}

/// Parse model text into a JSON object.
pub fn parse_object(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CrossLensError::Service(format!("Unable to parse model response: {e}")))?;
    into_object(value)
}

pub fn into_object(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CrossLensError::Service(
            "Model response payload was not a JSON object".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_payload() {
        let map = parse_object(r#"{"topic_category":"geopolitica"}"#).unwrap();
        assert_eq!(map["topic_category"], "geopolitica");
    }

    #[test]
    fn non_json_is_service_failure() {
        let err = parse_object("Sure! Here is the JSON you asked for").unwrap_err();
        assert!(matches!(err, CrossLensError::Service(_)));
        assert!(err.message().starts_with("Unable to parse model response"));
    }

    #[test]
    fn non_object_json_is_service_failure() {
        for raw in ["[1,2]", "\"text\"", "null", "42"] {
            assert!(matches!(parse_object(raw), Err(CrossLensError::Service(_))));
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let model = OpenAiModel::from_config(&AppConfig::default());
        let schema = NamedSchema::new("demo", serde_json::json!({"type": "object"}));

        let err = model.generate("instruction", "input", &schema).await.unwrap_err();
        assert_eq!(
            err,
            CrossLensError::Service("OpenAI API key not configured".to_string())
        );
    }
}
