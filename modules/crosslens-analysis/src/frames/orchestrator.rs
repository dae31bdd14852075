use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crosslens_common::{
    ArticleFrame, CountryResults, CrossLensError, FramesAnalyzeRequest, FramesAnalyzeResponse,
    ResolvedSource, Result, SearchResultItem,
};

use crate::extraction::ArticleExtractor;
use crate::model::StructuredModel;
use crate::orientation::OrientationRegistry;

use super::composer::{FrameComposer, FrameInput};

/// Where an article's analysis body came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ArticleBody {
    /// Readable text recovered from the page.
    Extracted { text: String, partial: bool },
    /// Extraction failed or produced nothing; the title and snippet stand in.
    Degraded,
}

impl ArticleBody {
    fn from_extraction(result: Result<crosslens_common::ArticleExtraction>) -> Result<Self> {
        match result {
            Ok(extraction) => {
                let text = extraction.text.trim();
                if text.is_empty() {
                    Ok(Self::Degraded)
                } else {
                    Ok(Self::Extracted {
                        text: text.to_string(),
                        partial: extraction.partial,
                    })
                }
            }
            Err(CrossLensError::Extraction(_)) => Ok(Self::Degraded),
            Err(other) => Err(other),
        }
    }

    fn partial(&self) -> bool {
        match self {
            Self::Extracted { partial, .. } => *partial,
            Self::Degraded => true,
        }
    }

    fn analysis_body(&self, item: &SearchResultItem) -> String {
        match self {
            Self::Extracted { text, .. } => text.clone(),
            Self::Degraded => format!("{}\n\n{}", item.title, item.snippet)
                .trim()
                .to_string(),
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Extracted { text, .. } => Some(text),
            Self::Degraded => None,
        }
    }
}

/// Drives frame composition for every candidate article of a run.
///
/// Extraction failures degrade the affected article only. Any other failure
/// aborts the whole run and no frames are returned.
pub struct FrameAnalysisOrchestrator {
    extractor: Arc<dyn ArticleExtractor>,
    composer: FrameComposer,
    concurrency: usize,
}

impl FrameAnalysisOrchestrator {
    pub fn new(extractor: Arc<dyn ArticleExtractor>, model: Arc<dyn StructuredModel>) -> Self {
        Self {
            extractor,
            composer: FrameComposer::new(model),
            concurrency: 1,
        }
    }

    /// Analyse up to `concurrency` articles at once. Output order and the
    /// abort-on-first-failure rule do not change.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run(&self, request: &FramesAnalyzeRequest) -> Result<FramesAnalyzeResponse> {
        let frames = self
            .analyze(
                &request.event_signature,
                &request.per_country_results,
                &request.resolved_sources,
            )
            .await?;
        Ok(FramesAnalyzeResponse {
            event_signature: request.event_signature.clone(),
            frames,
        })
    }

    /// Frames in input order: country order, then item order within a country.
    pub async fn analyze(
        &self,
        event_signature: &str,
        per_country_results: &[CountryResults],
        resolved_sources: &[ResolvedSource],
    ) -> Result<Vec<ArticleFrame>> {
        if event_signature.trim().is_empty() {
            return Err(CrossLensError::InvalidInput(
                "Event signature is required".to_string(),
            ));
        }

        let registry = OrientationRegistry::build(resolved_sources);
        let articles: Vec<(&str, &SearchResultItem)> = per_country_results
            .iter()
            .flat_map(|block| block.items.iter().map(move |item| (block.country.as_str(), item)))
            .collect();

        info!(
            articles = articles.len(),
            countries = per_country_results.len(),
            registry = registry.len(),
            concurrency = self.concurrency,
            "Starting frame analysis"
        );

        // Futures are built up front and only polled by `buffered`, so an
        // abort still leaves later articles untouched.
        let registry = &registry;
        let work: Vec<_> = articles
            .into_iter()
            .map(|(country, item)| self.analyze_article(event_signature, country, item, registry))
            .collect();

        stream::iter(work)
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn analyze_article(
        &self,
        event_signature: &str,
        country: &str,
        item: &SearchResultItem,
        registry: &OrientationRegistry,
    ) -> Result<ArticleFrame> {
        let inherited = registry.lookup(country, &item.source);

        let extraction = self.extractor.extract(&item.url).await;
        if let Err(CrossLensError::Extraction(ref reason)) = extraction {
            warn!(country, source = %item.source, url = %item.url, reason = %reason, "Extraction failed, using snippet");
        }
        let body = ArticleBody::from_extraction(extraction)?;

        let analysis_body = body.analysis_body(item);
        let input = FrameInput {
            event_signature,
            country,
            article: item,
            inherited_orientation: inherited,
            body: &analysis_body,
            partial_from_extraction: body.partial(),
        };

        let frame_card = self.composer.compose(&input).await?;

        info!(
            country,
            source = %item.source,
            url = %item.url,
            partial = frame_card.partial,
            "Frame composed"
        );
        Ok(ArticleFrame::new(country, item, body.into_text(), frame_card))
    }
}
