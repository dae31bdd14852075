use std::sync::Arc;

use ai_client::NamedSchema;
use schemars::JsonSchema;
use serde_json::Value;
use tracing::info;

use crosslens_common::{ContextBuildResult, Result};

use crate::model::StructuredModel;
use crate::normalize::{clean_list, normalize_query};

const CONTEXT_SYSTEM_PROMPT: &str = r#"You are an analyst preparing the initial context for CrossLens, a podcast that compares how news outlets in different countries cover the same event.

Return only valid JSON matching the provided schema. Identify:
- the nations involved, as ISO-3166 alpha-3 codes
- the actors (people) directly involved
- the organisations or institutions involved
- a high-level topic category for the event
- a concise event signature suitable for driving a news search

If a piece of information is not available, use an empty list or an empty string. Do not add any text outside the JSON."#;

/// What the model is asked to return for a query.
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ContextExtraction {
    /// ISO-3166 alpha-3 country codes involved in the event
    nations_involved: Vec<String>,
    /// People directly involved in the event
    actors: Vec<String>,
    /// Organisations or institutions involved
    organizations: Vec<String>,
    /// High level topic classification for the news event
    topic_category: String,
    /// Short event signature to drive subsequent search
    event_signature: String,
}

/// Turns a free-text query into a structured event context.
pub struct ContextBuilder {
    model: Arc<dyn StructuredModel>,
    schema: NamedSchema,
}

impl ContextBuilder {
    pub fn new(model: Arc<dyn StructuredModel>) -> Self {
        let schema = NamedSchema::of::<ContextExtraction>("crosslens_context_schema")
            .with_item_pattern("nations_involved", "^[A-Z]{3}$");
        Self { model, schema }
    }

    pub async fn build(&self, query: &str) -> Result<ContextBuildResult> {
        let normalized_query = normalize_query(query)?;

        let payload = self
            .model
            .generate(CONTEXT_SYSTEM_PROMPT, &normalized_query, &self.schema)
            .await?;

        let text = |key: &str| payload.get(key).and_then(Value::as_str).unwrap_or_default();

        let result = ContextBuildResult::new(
            normalized_query.clone(),
            clean_list(payload.get("nations_involved"), true),
            clean_list(payload.get("actors"), false),
            clean_list(payload.get("organizations"), false),
            text("topic_category"),
            text("event_signature"),
        )?;

        info!(
            query_len = normalized_query.len(),
            nations = result.nations_involved.len(),
            actors = result.actors.len(),
            topic = %result.topic_category,
            "Context built"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::MockModel;
    use crosslens_common::CrossLensError;

    #[test]
    fn schema_requires_all_five_fields_and_code_pattern() {
        let builder = ContextBuilder::new(Arc::new(MockModel::new()));
        let schema = &builder.schema.schema;

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        for field in [
            "nations_involved",
            "actors",
            "organizations",
            "topic_category",
            "event_signature",
        ] {
            assert!(required.contains(&field), "{field} should be required");
        }
        assert_eq!(
            schema["properties"]["nations_involved"]["items"]["pattern"],
            "^[A-Z]{3}$"
        );
        assert_eq!(builder.schema.name, "crosslens_context_schema");
    }

    #[tokio::test]
    async fn non_string_topic_is_service_failure() {
        let model = MockModel::new().respond(json!({
            "nations_involved": [],
            "actors": [],
            "organizations": [],
            "topic_category": 7,
            "event_signature": "Summit",
        }));
        let builder = ContextBuilder::new(Arc::new(model));

        let err = builder.build("Summit").await.unwrap_err();
        assert!(matches!(err, CrossLensError::Service(_)));
    }
}
