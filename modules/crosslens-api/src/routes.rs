use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use tracing::info;

use crosslens_common::{
    ContextBuildRequest, ContextBuildResult, FramesAnalyzeRequest, FramesAnalyzeResponse,
};

use crate::error::ApiError;
use crate::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn build_context(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContextBuildRequest>,
) -> Result<Json<ContextBuildResult>, ApiError> {
    let result = state.context_builder.build(&body.query).await?;
    Ok(Json(result))
}

pub async fn analyze_frames(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FramesAnalyzeRequest>,
) -> Result<Json<FramesAnalyzeResponse>, ApiError> {
    info!(
        countries = body.per_country_results.len(),
        resolved_sources = body.resolved_sources.len(),
        "Frame analysis requested"
    );
    let response = state.orchestrator.run(&body).await?;
    Ok(Json(response))
}
