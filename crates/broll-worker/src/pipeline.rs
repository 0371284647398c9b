//! End-to-end planner run.
//!
//! discover → filter to unseen → analyze each → merge + persist → suggest.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn, Instrument};

use broll_media::{classify, discover_media, ContentExtractor};
use broll_models::{BrollSuggestion, MediaItem, RunId};
use broll_storage::{AnalysisCache, CacheUpdate};

use crate::analyzer::ItemAnalyzer;
use crate::config::PlannerConfig;
use crate::error::WorkerResult;
use crate::gemini::GeminiClient;
use crate::logging::RunLogger;
use crate::suggestions::SuggestionRequester;

/// Result of one planner run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: RunId,
    /// Full analyzed set after the merge
    pub items: Vec<MediaItem>,
    /// Items analyzed during this run
    pub new_count: usize,
    /// Whether the cache file was written
    pub persisted: bool,
    pub suggestions: Vec<BrollSuggestion>,
}

/// Wires discovery, cache, analysis and suggestions together.
pub struct BrollPipeline {
    config: PlannerConfig,
    cache: AnalysisCache,
    extractor: ContentExtractor,
    analyzer: ItemAnalyzer,
    requester: SuggestionRequester,
}

impl BrollPipeline {
    pub fn new(
        config: PlannerConfig,
        extractor: ContentExtractor,
        analyzer: ItemAnalyzer,
        requester: SuggestionRequester,
    ) -> Self {
        let cache = AnalysisCache::new(config.cache_path.clone());
        Self {
            config,
            cache,
            extractor,
            analyzer,
            requester,
        }
    }

    /// Build the production pipeline: Gemini for both calls, FFmpeg for frames.
    pub fn from_config(config: PlannerConfig) -> WorkerResult<Self> {
        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);
        if gemini.has_api_key() {
            info!(model = %gemini.model(), "Gemini client ready");
        } else {
            warn!(model = %gemini.model(), "GEMINI_API_KEY not set, every analysis will fall back");
        }

        let frames = Arc::new(config.frame_extractor());
        let extractor = ContentExtractor::new(frames, Some(config.transcript_dir.clone()));
        let analyzer = ItemAnalyzer::new(gemini.clone(), config.context_excerpt_chars);
        let requester = SuggestionRequester::new(gemini);

        Ok(Self::new(config, extractor, analyzer, requester))
    }

    /// Run the whole workflow once. Never fails; degraded steps are logged.
    pub async fn run(&self) -> RunOutcome {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, "analysis");
        let span = logger.create_span();

        async {
            logger.log_start(&format!("media_dir={}", self.config.media_dir.display()));

            let context = read_context(&self.config.context_path).await;
            let discovered = discover_media(&self.config.media_dir);
            logger.log_progress(&format!("discovered {} media files", discovered.len()));

            let update = self.update_cache(&discovered, &context).await;
            for record in update.new_records() {
                debug!(filename = record.filename(), "Analyzed this run");
            }
            if !update.persisted() {
                logger.log_error("analysis cache was not written");
            }
            metrics::counter!("broll_runs_total", "persisted" => update.persisted().to_string())
                .increment(1);
            metrics::counter!("broll_items_cached_total")
                .increment(update.len().saturating_sub(update.new_count()) as u64);

            let items = update.items();
            let suggest_logger = logger.for_phase("suggestions");
            suggest_logger.log_progress(&format!("requesting suggestions for {} items", items.len()));
            let suggestions = self.requester.suggest(&items, &context).await;

            suggest_logger.log_completion(&format!(
                "{} items ({} new), {} suggestions",
                items.len(),
                update.new_count(),
                suggestions.len()
            ));

            RunOutcome {
                run_id: run_id.clone(),
                items,
                new_count: update.new_count(),
                persisted: update.persisted(),
                suggestions,
            }
        }
        .instrument(span)
        .await
    }

    /// Analyze the unseen subset of `discovered` and persist the merged cache.
    pub async fn update_cache(&self, discovered: &[PathBuf], context: &str) -> CacheUpdate {
        self.cache
            .update(discovered, move |path| self.analyze_path(path, context))
            .await
    }

    async fn analyze_path(&self, path: PathBuf, context: &str) -> MediaItem {
        let kind = classify(&path);
        let content = self.extractor.extract(&path, kind).await;
        self.analyzer.analyze(&path, kind, &content, context).await
    }
}

/// Read the marketing context document; empty when unreadable.
pub async fn read_context(path: &Path) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            info!(path = %path.display(), chars = text.chars().count(), "Loaded marketing context");
            text
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Marketing context unavailable, using empty context");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_context_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_context(&dir.path().join("nope.txt")).await, "");
    }

    #[tokio::test]
    async fn test_read_context_returns_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("context.txt");
        tokio::fs::write(&path, "Spring launch").await.unwrap();

        assert_eq!(read_context(&path).await, "Spring launch");
    }
}
