// Test mocks for the analysis pipeline.
//
// Two mocks matching the two capability boundaries:
// - MockModel (StructuredModel): scripted JSON responses, captured calls
// - MockExtractor (ArticleExtractor): HashMap-based URL→text or failure
//
// Plus builders for search-stage input and a valid frame payload.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use ai_client::NamedSchema;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crosslens_common::{
    ArticleExtraction, CountryResults, CrossLensError, ResolvedSource, Result, SearchResultItem,
};

use crate::extraction::ArticleExtractor;
use crate::model::{into_object, StructuredModel};

// ---------------------------------------------------------------------------
// MockModel
// ---------------------------------------------------------------------------

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub instruction: String,
    pub input: String,
    pub schema_name: String,
}

/// Replies with scripted responses in order, then with the `always` payload
/// if one is set. Non-object payloads fail the way a real model would.
pub struct MockModel {
    scripted: Mutex<VecDeque<Result<Value>>>,
    always: Option<Value>,
    calls: Mutex<Vec<ModelCall>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            always: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `payload` once.
    pub fn respond(self, payload: Value) -> Self {
        self.scripted.lock().unwrap().push_back(Ok(payload));
        self
    }

    /// Fail once with `err`.
    pub fn fail(self, err: CrossLensError) -> Self {
        self.scripted.lock().unwrap().push_back(Err(err));
        self
    }

    /// Reply with `payload` whenever nothing is scripted.
    pub fn always(mut self, payload: Value) -> Self {
        self.always = Some(payload);
        self
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StructuredModel for MockModel {
    async fn generate(
        &self,
        instruction: &str,
        input: &str,
        schema: &NamedSchema,
    ) -> Result<Map<String, Value>> {
        self.calls.lock().unwrap().push(ModelCall {
            instruction: instruction.to_string(),
            input: input.to_string(),
            schema_name: schema.name.clone(),
        });

        let next = self.scripted.lock().unwrap().pop_front();
        match next {
            Some(reply) => into_object(reply?),
            None => match self.always {
                Some(ref payload) => into_object(payload.clone()),
                None => Err(CrossLensError::Service(
                    "MockModel: no response scripted".to_string(),
                )),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Returns `Extraction` errors for unregistered URLs.
/// Builder pattern: `.on_page()`, `.on_partial_page()`, `.on_error()`.
pub struct MockExtractor {
    pages: HashMap<String, Result<ArticleExtraction>>,
    fallback: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every URL yields `text` unless registered otherwise.
    pub fn always(text: &str) -> Self {
        Self {
            fallback: Some(text.to_string()),
            ..Self::new()
        }
    }

    pub fn on_page(mut self, url: &str, text: &str) -> Self {
        self.pages
            .insert(url.to_string(), Ok(ArticleExtraction::complete(text)));
        self
    }

    pub fn on_partial_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            Ok(ArticleExtraction {
                text: text.to_string(),
                partial: true,
            }),
        );
        self
    }

    pub fn on_error(mut self, url: &str, err: CrossLensError) -> Self {
        self.pages.insert(url.to_string(), Err(err));
        self
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleExtractor for MockExtractor {
    async fn extract(&self, url: &str) -> Result<ArticleExtraction> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(result) = self.pages.get(url) {
            return result.clone();
        }
        match self.fallback {
            Some(ref text) => Ok(ArticleExtraction::complete(text.as_str())),
            None => Err(CrossLensError::Extraction(format!(
                "MockExtractor: no page registered for {url}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn article(source: &str, url: &str) -> SearchResultItem {
    SearchResultItem {
        source: source.to_string(),
        domain: url
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .unwrap_or_default()
            .trim_start_matches("www.")
            .to_string(),
        url: url.to_string(),
        title: format!("{source} headline"),
        snippet: format!("{source} snippet"),
    }
}

pub fn country(code: &str, items: Vec<SearchResultItem>) -> CountryResults {
    CountryResults {
        country: code.to_string(),
        items,
    }
}

pub fn resolved(country: &str, source: &str, orientation: &str) -> ResolvedSource {
    ResolvedSource {
        country: country.to_string(),
        source: source.to_string(),
        orientation: orientation.to_string(),
    }
}

/// A frame payload that passes validation.
pub fn frame_payload() -> Value {
    json!({
        "tone": "analitico",
        "stance": "critico",
        "frame_label": "Focus su compromesso",
        "key_claims": ["Claim 1", "Claim 2"],
        "evidence_level": "alto",
        "orientation_inherited": null,
        "orientation_detected": "critico",
        "partial": false,
    })
}
