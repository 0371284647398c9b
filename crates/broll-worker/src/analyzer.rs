//! Per-file media analysis.
//!
//! One description request per unseen file. Any failure (transport, status,
//! credential, malformed answer) turns into the deterministic fallback item so
//! the file still lands in the cache and is not retried.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use broll_media::{ExtractedContent, StillImage};
use broll_models::{MediaItem, MediaType, FALLBACK_RELEVANCE};
use broll_storage::base_name;

use crate::error::{WorkerError, WorkerResult};
use crate::gemini::GeminiClient;

/// System instruction for per-file description requests.
const DESCRIBE_SYSTEM_INSTRUCTION: &str = r#"You are a video editor's assistant cataloguing B-roll footage for a marketing video.
Look at the media you are given and describe it so an editor can decide where it fits.

Return ONLY a single JSON object with this schema:
{
  "description": "One or two sentences describing what is shown",
  "relevance": "high | medium | low, followed by a short justification against the marketing context"
}
You may add further fields (for example "tags" or "mood") if they help, but never omit "description"."#;

/// Everything sent to the analysis service about one file.
#[derive(Debug, Clone, Copy)]
pub struct DescribeRequest<'a> {
    pub filename: &'a str,
    pub media_type: MediaType,
    pub context_excerpt: &'a str,
    pub transcript: Option<&'a str>,
    pub image: Option<&'a StillImage>,
}

impl DescribeRequest<'_> {
    /// The user message bundling context, file facts and transcript.
    pub fn user_message(&self) -> String {
        let mut message = format!(
            "MARKETING CONTEXT (excerpt):\n{}\n\nFILENAME: {}\nMEDIA TYPE: {}\n",
            self.context_excerpt, self.filename, self.media_type
        );

        match self.transcript {
            Some(transcript) => {
                message.push_str("\nTRANSCRIPT:\n");
                message.push_str(transcript);
                message.push('\n');
            }
            None if self.media_type == MediaType::Video => {
                message.push_str("\nNo transcript is available for this video.\n");
            }
            None => {}
        }

        if self.image.is_none() {
            message.push_str("\nNo image is attached; judge from the filename and transcript only.\n");
        }

        message
    }
}

/// Capability to describe one media file.
#[async_trait]
pub trait MediaDescriber: Send + Sync {
    /// Returns the raw JSON answer.
    async fn describe(&self, request: &DescribeRequest<'_>) -> WorkerResult<Value>;
}

#[async_trait]
impl MediaDescriber for GeminiClient {
    async fn describe(&self, request: &DescribeRequest<'_>) -> WorkerResult<Value> {
        self.generate_json(DESCRIBE_SYSTEM_INSTRUCTION, request.user_message(), request.image)
            .await
    }
}

/// Produces one [`MediaItem`] per file, falling back on failure.
#[derive(Clone)]
pub struct ItemAnalyzer {
    describer: Arc<dyn MediaDescriber>,
    context_excerpt_chars: usize,
}

impl ItemAnalyzer {
    pub fn new(describer: Arc<dyn MediaDescriber>, context_excerpt_chars: usize) -> Self {
        Self {
            describer,
            context_excerpt_chars,
        }
    }

    /// Analyze one file. Never fails.
    pub async fn analyze(
        &self,
        path: &Path,
        media_type: MediaType,
        content: &ExtractedContent,
        context: &str,
    ) -> MediaItem {
        let filename = base_name(path);

        let request = DescribeRequest {
            filename: &filename,
            media_type,
            context_excerpt: excerpt(context, self.context_excerpt_chars),
            transcript: content.transcript.as_deref(),
            image: content.image.as_ref(),
        };

        let result = self
            .describer
            .describe(&request)
            .await
            .and_then(|value| coerce_item(value, &filename, media_type));

        match result {
            Ok(item) => {
                metrics::counter!("broll_items_analyzed_total", "outcome" => "success").increment(1);
                info!(filename = %filename, media_type = %media_type, "Analyzed media file");
                item
            }
            Err(e) => {
                metrics::counter!("broll_items_analyzed_total", "outcome" => "fallback").increment(1);
                warn!(
                    filename = %filename,
                    media_type = %media_type,
                    error = %e,
                    "Media analysis failed, recording fallback"
                );
                MediaItem::fallback(filename, media_type)
            }
        }
    }
}

/// Bounded prefix of `text`, at most `max_chars` characters.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Coerce a raw analysis answer into a [`MediaItem`].
///
/// `filename` and `media_type` always come from the caller. An array answer
/// uses its first element. `description` must be a non-empty string; a
/// missing `relevance` becomes `"unknown"`. Every other field is kept.
pub fn coerce_item(value: Value, filename: &str, media_type: MediaType) -> WorkerResult<MediaItem> {
    let value = match value {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| WorkerError::ai_failed("Empty array in analysis response"))?,
        other => other,
    };

    let mut fields: Map<String, Value> = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(WorkerError::ai_failed(format!(
                "Analysis response is not an object: {}",
                other
            )))
        }
    };

    fields.remove("filename");
    fields.remove("media_type");

    let description = match fields.remove("description") {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        _ => return Err(WorkerError::ai_failed("Analysis response has no description")),
    };

    let relevance = match fields.remove("relevance") {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        None | Some(Value::Null) | Some(Value::String(_)) => FALLBACK_RELEVANCE.to_string(),
        Some(other) => other.to_string(),
    };

    Ok(MediaItem {
        filename: filename.to_string(),
        media_type,
        description,
        relevance,
        extra: fields,
    })
}
