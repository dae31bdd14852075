use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crosslens_analysis::{
    extractor_from_config, ContextBuilder, FrameAnalysisOrchestrator, OpenAiModel,
};
use crosslens_api::{router, AppState};
use crosslens_common::{AppConfig, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::from_default_env().add_directive("crosslens=info".parse()?);
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    config.log_keys();

    let model = Arc::new(OpenAiModel::from_config(&config));
    let extractor = extractor_from_config(&config)?;

    let state = Arc::new(AppState {
        context_builder: ContextBuilder::new(model.clone()),
        orchestrator: FrameAnalysisOrchestrator::new(extractor, model)
            .with_concurrency(config.analysis_concurrency),
    });

    let app = router(state, &config.allowed_origins);

    let addr = format!("{}:{}", config.host, config.port);
    info!("CrossLens API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
