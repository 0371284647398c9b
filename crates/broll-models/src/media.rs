//! Analyzed media models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Description recorded when analysis of a file did not succeed.
pub const FALLBACK_DESCRIPTION: &str = "No description found";
/// Relevance recorded when analysis of a file did not succeed.
pub const FALLBACK_RELEVANCE: &str = "unknown";

/// Offset into a video at which the representative still frame is grabbed.
pub const DEFAULT_FRAME_OFFSET_SECS: f64 = 5.0;

/// Kind of media a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Other,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Other => "other",
            MediaType::Unknown => "unknown",
        }
    }

    /// Whether files of this kind are sent for analysis at all.
    pub fn is_media(&self) -> bool {
        matches!(self, MediaType::Image | MediaType::Video)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One analyzed file.
///
/// `filename` is the base name of the file and is the identity key of the
/// analysis cache. Fields the analysis service returns beyond the named ones
/// are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MediaItem {
    /// Base file name (no directory component)
    pub filename: String,

    /// Detected media kind
    #[serde(default)]
    pub media_type: MediaType,

    /// Short summary of what the file shows
    #[serde(default = "default_description")]
    pub description: String,

    /// How relevant the file is to the marketing context
    #[serde(default = "default_relevance")]
    pub relevance: String,

    /// Any additional fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_description() -> String {
    FALLBACK_DESCRIPTION.to_string()
}

fn default_relevance() -> String {
    FALLBACK_RELEVANCE.to_string()
}

impl MediaItem {
    /// Create a new analyzed item with no extra fields.
    pub fn new(
        filename: impl Into<String>,
        media_type: MediaType,
        description: impl Into<String>,
        relevance: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            media_type,
            description: description.into(),
            relevance: relevance.into(),
            extra: Map::new(),
        }
    }

    /// The item recorded when analysis fails.
    pub fn fallback(filename: impl Into<String>, media_type: MediaType) -> Self {
        Self::new(filename, media_type, FALLBACK_DESCRIPTION, FALLBACK_RELEVANCE)
    }

    /// Returns a new item with an extra field set.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Whether this item carries the fallback description.
    pub fn is_fallback(&self) -> bool {
        self.description == FALLBACK_DESCRIPTION
    }
}
