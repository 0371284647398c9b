//! B-roll suggestion request.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use broll_models::{BrollSuggestion, MediaItem, SuggestionSet};

use crate::error::{WorkerError, WorkerResult};
use crate::gemini::GeminiClient;

const SUGGEST_SYSTEM_INSTRUCTION: &str = r#"You are an experienced video editor planning B-roll for a marketing video.
You receive a catalogue of analyzed media files and the marketing context.
For each primary video clip, recommend which other files to overlay as B-roll and when.

Rules:
- Only reference filenames that appear in the catalogue
- "start" is seconds from the beginning of the primary clip and must be >= 0
- "duration" is in seconds and must be > 0
- Omit clips that need no B-roll

Return ONLY JSON matching this schema:"#;

/// Capability to request suggestions for an analyzed set.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Returns the raw JSON answer.
    async fn request_suggestions(&self, items: &[MediaItem], context: &str) -> WorkerResult<Value>;
}

#[async_trait]
impl SuggestionSource for GeminiClient {
    async fn request_suggestions(&self, items: &[MediaItem], context: &str) -> WorkerResult<Value> {
        let schema = serde_json::to_string_pretty(&schemars::schema_for!(SuggestionSet))?;
        let system_instruction = format!("{}\n{}", SUGGEST_SYSTEM_INSTRUCTION, schema);

        let user_text = format!(
            "MARKETING CONTEXT:\n{}\n\nMEDIA CATALOGUE:\n{}",
            context,
            serde_json::to_string_pretty(items)?
        );

        self.generate_json(&system_instruction, user_text, None).await
    }
}

/// Turns the analyzed set into suggestions, never failing.
#[derive(Clone)]
pub struct SuggestionRequester {
    source: Arc<dyn SuggestionSource>,
}

impl SuggestionRequester {
    pub fn new(source: Arc<dyn SuggestionSource>) -> Self {
        Self { source }
    }

    /// Request suggestions once. Any failure yields an empty list.
    pub async fn suggest(&self, items: &[MediaItem], context: &str) -> Vec<BrollSuggestion> {
        if items.is_empty() {
            info!("No analyzed media, skipping suggestion request");
            return Vec::new();
        }

        let result = self
            .source
            .request_suggestions(items, context)
            .await
            .and_then(coerce_suggestions);

        match result {
            Ok(suggestions) => {
                metrics::counter!("broll_suggestion_requests_total", "outcome" => "success")
                    .increment(1);
                info!(count = suggestions.len(), "Received B-roll suggestions");
                suggestions
            }
            Err(e) => {
                metrics::counter!("broll_suggestion_requests_total", "outcome" => "failure")
                    .increment(1);
                warn!(error = %e, "Suggestion request failed, returning no suggestions");
                Vec::new()
            }
        }
    }
}

/// Coerce a raw suggestion answer.
///
/// Accepts `{"suggestions": [...]}` or a bare array. Invalid overlays are
/// dropped, then suggestions left without overlays.
pub fn coerce_suggestions(value: Value) -> WorkerResult<Vec<BrollSuggestion>> {
    let suggestions = match value {
        Value::Array(_) => serde_json::from_value::<Vec<BrollSuggestion>>(value)?,
        Value::Object(_) => serde_json::from_value::<SuggestionSet>(value)?.suggestions,
        other => {
            return Err(WorkerError::ai_failed(format!(
                "Unexpected suggestion response: {}",
                other
            )))
        }
    };

    Ok(suggestions
        .into_iter()
        .filter_map(|mut suggestion| {
            for reason in suggestion.retain_valid() {
                warn!(filename = %suggestion.filename, reason = %reason, "Dropping invalid overlay");
            }
            (!suggestion.overlays.is_empty()).then_some(suggestion)
        })
        .collect())
}
