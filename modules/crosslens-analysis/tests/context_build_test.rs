//! Context build chain tests.
//!
//! MOCK → FUNCTION → OUTPUT: script the model, call `ContextBuilder::build`,
//! assert on the result and on what the model was sent.

use std::sync::Arc;

use serde_json::json;

use crosslens_analysis::testing::MockModel;
use crosslens_analysis::ContextBuilder;
use crosslens_common::CrossLensError;

fn context_payload() -> serde_json::Value {
    json!({
        "nations_involved": ["rus", "USA"],
        "actors": [" Vladimir Putin ", ""],
        "organizations": ["Kremlin"],
        "topic_category": "geopolitica",
        "event_signature": "Summit Putin-Trump su Ucraina",
    })
}

#[tokio::test]
async fn query_is_normalized_and_payload_cleaned() {
    let model = Arc::new(MockModel::new().respond(context_payload()));
    let builder = ContextBuilder::new(model.clone());

    let result = builder.build("  Putin   e  Trump  ").await.unwrap();

    assert_eq!(result.normalized_query, "Putin e Trump");
    assert_eq!(result.nations_involved, vec!["RUS", "USA"]);
    assert_eq!(result.actors, vec!["Vladimir Putin"]);
    assert_eq!(result.organizations, vec!["Kremlin"]);
    assert_eq!(result.topic_category, "geopolitica");
    assert_eq!(result.event_signature, "Summit Putin-Trump su Ucraina");

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].input, "Putin e Trump");
    assert_eq!(calls[0].schema_name, "crosslens_context_schema");
}

#[tokio::test]
async fn blank_query_fails_before_model_call() {
    let model = Arc::new(MockModel::new().respond(context_payload()));
    let builder = ContextBuilder::new(model.clone());

    let err = builder.build("   \t ").await.unwrap_err();

    assert!(matches!(err, CrossLensError::InvalidInput(_)));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn empty_topic_and_signature_is_service_failure() {
    let model = MockModel::new().respond(json!({
        "nations_involved": [],
        "actors": [],
        "organizations": [],
        "topic_category": "",
        "event_signature": "",
    }));
    let builder = ContextBuilder::new(Arc::new(model));

    let err = builder.build("Event").await.unwrap_err();
    assert!(matches!(err, CrossLensError::Service(_)));
}

#[tokio::test]
async fn missing_fields_are_service_failure() {
    let model = MockModel::new().respond(json!({ "nations_involved": ["ITA"] }));
    let builder = ContextBuilder::new(Arc::new(model));

    let err = builder.build("Evento").await.unwrap_err();
    assert_eq!(
        err,
        CrossLensError::Service("Model response missing required fields".to_string())
    );
}

#[tokio::test]
async fn malformed_country_codes_pass_through_uppercased() {
    let model = MockModel::new().respond(json!({
        "nations_involved": ["italy", " fr ", 42, null, "", "rus", "RUS"],
        "actors": [],
        "organizations": [],
        "topic_category": "diplomazia",
        "event_signature": "Vertice",
    }));
    let builder = ContextBuilder::new(Arc::new(model));

    let result = builder.build("vertice").await.unwrap();
    assert_eq!(result.nations_involved, vec!["ITALY", "FR", "RUS", "RUS"]);
    assert!(result
        .nations_involved
        .iter()
        .all(|c| !c.is_empty() && c == &c.to_uppercase()));
}

#[tokio::test]
async fn non_object_response_is_service_failure() {
    let model = MockModel::new().respond(json!(["RUS", "USA"]));
    let builder = ContextBuilder::new(Arc::new(model));

    let err = builder.build("Putin").await.unwrap_err();
    assert!(matches!(err, CrossLensError::Service(_)));
}

#[tokio::test]
async fn model_failure_propagates_unchanged() {
    let model = MockModel::new().fail(CrossLensError::Service(
        "OpenAI API key not configured".to_string(),
    ));
    let builder = ContextBuilder::new(Arc::new(model));

    let err = builder.build("Putin").await.unwrap_err();
    assert_eq!(err.message(), "OpenAI API key not configured");
}
