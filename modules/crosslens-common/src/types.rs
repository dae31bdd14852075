use serde::{Deserialize, Serialize};

use crate::error::{CrossLensError, Result};

// --- Context Build ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBuildRequest {
    pub query: String,
}

/// Structured event context extracted from a free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBuildResult {
    pub normalized_query: String,
    /// Upper-cased country codes in model order. Duplicates pass through.
    pub nations_involved: Vec<String>,
    pub actors: Vec<String>,
    pub organizations: Vec<String>,
    pub topic_category: String,
    pub event_signature: String,
}

impl ContextBuildResult {
    /// Build a result, rejecting an empty topic category or event signature.
    /// Both are trimmed before the check.
    pub fn new(
        normalized_query: String,
        nations_involved: Vec<String>,
        actors: Vec<String>,
        organizations: Vec<String>,
        topic_category: &str,
        event_signature: &str,
    ) -> Result<Self> {
        let topic_category = topic_category.trim();
        let event_signature = event_signature.trim();
        if topic_category.is_empty() || event_signature.is_empty() {
            return Err(CrossLensError::Service(
                "Model response missing required fields".to_string(),
            ));
        }

        Ok(Self {
            normalized_query,
            nations_involved,
            actors,
            organizations,
            topic_category: topic_category.to_string(),
            event_signature: event_signature.to_string(),
        })
    }
}

// --- Search Stage Output ---

/// An outlet's known editorial orientation, as resolved by the search stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSource {
    pub country: String,
    pub source: String,
    pub orientation: String,
}

/// One candidate article. Title and snippet are always present, even when the
/// body later fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub source: String,
    pub domain: String,
    pub url: String,
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryResults {
    pub country: String,
    #[serde(default)]
    pub items: Vec<SearchResultItem>,
}

// --- Frame Analysis ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramesAnalyzeRequest {
    pub event_signature: String,
    #[serde(default)]
    pub per_country_results: Vec<CountryResults>,
    #[serde(default)]
    pub resolved_sources: Vec<ResolvedSource>,
}

/// How one article frames the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCard {
    pub tone: String,
    pub stance: String,
    pub frame_label: String,
    pub key_claims: Vec<String>,
    pub evidence_level: String,
    /// Registry orientation, falling back to what the model echoed.
    pub orientation_inherited: Option<String>,
    /// The model's own reading of the outlet's orientation.
    pub orientation_detected: Option<String>,
    /// True once any stage worked from incomplete evidence.
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFrame {
    pub country: String,
    pub source: String,
    pub domain: String,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub extracted_text: Option<String>,
    pub frame_card: FrameCard,
}

impl ArticleFrame {
    pub fn new(
        country: &str,
        item: &SearchResultItem,
        extracted_text: Option<String>,
        frame_card: FrameCard,
    ) -> Self {
        Self {
            country: country.to_string(),
            source: item.source.clone(),
            domain: item.domain.clone(),
            url: item.url.clone(),
            title: item.title.clone(),
            snippet: item.snippet.clone(),
            extracted_text,
            frame_card,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramesAnalyzeResponse {
    pub event_signature: String,
    pub frames: Vec<ArticleFrame>,
}

// --- Article Extraction ---

/// Readable body text recovered from an article URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleExtraction {
    pub text: String,
    pub partial: bool,
}

impl ArticleExtraction {
    pub fn complete(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            partial: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(topic: &str, signature: &str) -> Result<ContextBuildResult> {
        ContextBuildResult::new(
            "Putin e Trump".to_string(),
            vec!["RUS".to_string()],
            vec![],
            vec![],
            topic,
            signature,
        )
    }

    #[test]
    fn context_result_trims_required_fields() {
        let result = context("  geopolitica ", " Summit ").unwrap();
        assert_eq!(result.topic_category, "geopolitica");
        assert_eq!(result.event_signature, "Summit");
    }

    #[test]
    fn context_result_rejects_blank_topic_or_signature() {
        assert!(matches!(context("   ", "Summit"), Err(CrossLensError::Service(_))));
        assert!(matches!(context("geopolitica", ""), Err(CrossLensError::Service(_))));
    }

    #[test]
    fn analyze_request_defaults_missing_lists() {
        let request: FramesAnalyzeRequest =
            serde_json::from_str(r#"{"event_signature":"Summit"}"#).unwrap();
        assert!(request.per_country_results.is_empty());
        assert!(request.resolved_sources.is_empty());
    }

    #[test]
    fn frame_card_serializes_missing_orientation_as_null() {
        let card = FrameCard {
            tone: "analitico".to_string(),
            stance: "critico".to_string(),
            frame_label: "Compromesso".to_string(),
            key_claims: vec!["Claim".to_string()],
            evidence_level: "alto".to_string(),
            orientation_inherited: None,
            orientation_detected: None,
            partial: true,
        };
        let value = serde_json::to_value(&card).unwrap();
        assert!(value["orientation_inherited"].is_null());
        assert!(value["orientation_detected"].is_null());
        assert_eq!(value["partial"], true);
    }
}
