use std::sync::Arc;

use ai_client::NamedSchema;
use schemars::JsonSchema;
use serde_json::{Map, Value};

use crosslens_common::{CrossLensError, FrameCard, Result, SearchResultItem};

use crate::model::StructuredModel;
use crate::normalize::clean_list;

const FRAME_SYSTEM_PROMPT: &str = r#"You are a media analyst for CrossLens. You will receive information about a single news article: country, outlet, known editorial orientation, title, search snippet and extracted text.

Produce ONE Frame Card describing the article's tone, stance, frame label, key claims (2-5 short points), level of evidence, and the orientation you detect in the coverage, if any.

Return only valid JSON matching the schema. If the content is marked as partial, set the partial field accordingly."#;

/// Prompt bodies beyond this many bytes are cut at a char boundary.
const MAX_BODY_BYTES: usize = 30_000;
/// Claims past this count are dropped; the schema asks for 2 to 5 but a
/// single cleaned claim is still accepted.
const MAX_KEY_CLAIMS: usize = 5;

/// What the model is asked to return for one article.
#[allow(dead_code)]
#[derive(JsonSchema)]
struct FrameCardSchema {
    tone: String,
    stance: String,
    frame_label: String,
    #[schemars(length(min = 2, max = 5))]
    key_claims: Vec<String>,
    evidence_level: String,
    orientation_inherited: Option<String>,
    orientation_detected: Option<String>,
    partial: bool,
}

/// Everything known about one article when its frame card is composed.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub event_signature: &'a str,
    pub country: &'a str,
    pub article: &'a SearchResultItem,
    pub inherited_orientation: Option<&'a str>,
    /// Extracted body, or the title/snippet fallback.
    pub body: &'a str,
    pub partial_from_extraction: bool,
}

impl FrameInput<'_> {
    /// Registry orientation as stored, ignoring blank values.
    fn inherited(&self) -> Option<&str> {
        self.inherited_orientation
            .filter(|o| !o.trim().is_empty())
    }
}

pub struct FrameComposer {
    model: Arc<dyn StructuredModel>,
    schema: NamedSchema,
}

impl FrameComposer {
    pub fn new(model: Arc<dyn StructuredModel>) -> Self {
        Self {
            model,
            schema: NamedSchema::of::<FrameCardSchema>("crosslens_frame_schema"),
        }
    }

    pub async fn compose(&self, input: &FrameInput<'_>) -> Result<FrameCard> {
        let prompt = frame_prompt(input);
        let payload = self
            .model
            .generate(FRAME_SYSTEM_PROMPT, &prompt, &self.schema)
            .await?;
        card_from_payload(&payload, input)
    }
}

pub(crate) fn frame_prompt(input: &FrameInput<'_>) -> String {
    let completeness = if input.partial_from_extraction {
        "partial"
    } else {
        "complete"
    };

    [
        format!("Event signature: {}", input.event_signature),
        format!("Country: {}", input.country),
        format!("Source: {} ({})", input.article.source, input.article.domain),
        format!(
            "Orientation inherited: {}",
            input.inherited().unwrap_or("not available")
        ),
        format!("Content completeness: {completeness}"),
        String::new(),
        "Title:".to_string(),
        input.article.title.trim().to_string(),
        String::new(),
        "Snippet:".to_string(),
        input.article.snippet.trim().to_string(),
        String::new(),
        "Content to analyze:".to_string(),
        truncate_to_char_boundary(input.body.trim(), MAX_BODY_BYTES).to_string(),
    ]
    .join("\n")
}

/// Validate the model payload and merge it with what the pipeline already
/// knows. The schema is not trusted: every field is re-checked here.
fn card_from_payload(payload: &Map<String, Value>, input: &FrameInput<'_>) -> Result<FrameCard> {
    let tone = required_text(payload, "tone")?;
    let stance = required_text(payload, "stance")?;
    let frame_label = required_text(payload, "frame_label")?;
    let evidence_level = required_text(payload, "evidence_level")?;

    let mut key_claims = clean_list(payload.get("key_claims"), false);
    if key_claims.is_empty() {
        return Err(CrossLensError::Service(
            "Model response missing key_claims".to_string(),
        ));
    }
    key_claims.truncate(MAX_KEY_CLAIMS);

    let orientation_inherited = match input.inherited() {
        Some(registry) => Some(registry.to_string()),
        None => payload
            .get("orientation_inherited")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
    };
    let orientation_detected = optional_text(payload.get("orientation_detected"));

    let model_partial = payload.get("partial").is_some_and(truthy);

    Ok(FrameCard {
        tone,
        stance,
        frame_label,
        key_claims,
        evidence_level,
        orientation_inherited,
        orientation_detected,
        partial: input.partial_from_extraction || model_partial,
    })
}

fn required_text(payload: &Map<String, Value>, key: &str) -> Result<String> {
    let Some(value) = payload.get(key).and_then(Value::as_str) else {
        return Err(CrossLensError::Service(format!(
            "Model response missing field '{key}'"
        )));
    };
    let cleaned = value.trim();
    if cleaned.is_empty() {
        return Err(CrossLensError::Service(format!(
            "Model response provided empty field '{key}'"
        )));
    }
    Ok(cleaned.to_string())
}

/// Strings are trimmed, other scalars stringified; null and blank mean absent.
fn optional_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// JSON truthiness: false, null, 0, "" and empty containers are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
