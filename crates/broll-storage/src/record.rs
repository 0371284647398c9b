//! Cache records.

use serde::Serialize;
use serde_json::{Map, Value};

use broll_models::{MediaItem, MediaType, FALLBACK_DESCRIPTION, FALLBACK_RELEVANCE};

const FILENAME: &str = "filename";
const MEDIA_TYPE: &str = "media_type";
const DESCRIPTION: &str = "description";
const RELEVANCE: &str = "relevance";

/// One analysis-cache record, kept exactly as it was read.
///
/// The only field the cache interprets is `filename`, which must be a string.
/// Every other field is written back untouched, including values that would
/// not fit [`MediaItem`] (an unlisted `media_type`, a `null` description).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CacheRecord {
    fields: Map<String, Value>,
}

impl CacheRecord {
    /// Accept a raw JSON record. Returns `None` unless it is an object with a
    /// string `filename`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) if fields.get(FILENAME).is_some_and(Value::is_string) => {
                Some(Self { fields })
            }
            _ => None,
        }
    }

    /// Identity key of the record.
    pub fn filename(&self) -> &str {
        self.fields
            .get(FILENAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Typed view of the record.
    ///
    /// Missing or ill-typed fields read as the fallback values; an unlisted
    /// media type reads as `unknown`. The record itself is not changed.
    pub fn to_item(&self) -> MediaItem {
        let media_type = self
            .fields
            .get(MEDIA_TYPE)
            .and_then(|value| serde_json::from_value::<MediaType>(value.clone()).ok())
            .unwrap_or_default();

        let description = match self.fields.get(DESCRIPTION) {
            Some(Value::String(text)) => text.clone(),
            _ => FALLBACK_DESCRIPTION.to_string(),
        };

        let relevance = match self.fields.get(RELEVANCE) {
            Some(Value::String(text)) => text.clone(),
            None | Some(Value::Null) => FALLBACK_RELEVANCE.to_string(),
            Some(other) => other.to_string(),
        };

        let extra = self
            .fields
            .iter()
            .filter(|(key, _)| ![FILENAME, MEDIA_TYPE, DESCRIPTION, RELEVANCE].contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        MediaItem {
            filename: self.filename().to_string(),
            media_type,
            description,
            relevance,
            extra,
        }
    }
}

impl From<MediaItem> for CacheRecord {
    fn from(item: MediaItem) -> Self {
        let mut fields = Map::new();
        fields.insert(FILENAME.to_string(), Value::String(item.filename));
        fields.insert(
            MEDIA_TYPE.to_string(),
            Value::String(item.media_type.as_str().to_string()),
        );
        fields.insert(DESCRIPTION.to_string(), Value::String(item.description));
        fields.insert(RELEVANCE.to_string(), Value::String(item.relevance));

        for (key, value) in item.extra {
            fields.entry(key).or_insert(value);
        }

        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_string_filename() {
        assert!(CacheRecord::from_value(json!({ "filename": "a.mp4" })).is_some());
        assert!(CacheRecord::from_value(json!({ "description": "no name" })).is_none());
        assert!(CacheRecord::from_value(json!({ "filename": 7 })).is_none());
        assert!(CacheRecord::from_value(json!(["a.mp4"])).is_none());
    }

    #[test]
    fn test_lenient_view_of_sparse_record() {
        let record = CacheRecord::from_value(json!({
            "filename": "a.mp4",
            "media_type": "audio",
            "description": null,
            "score": 3
        }))
        .unwrap();

        let item = record.to_item();
        assert_eq!(item.filename, "a.mp4");
        assert_eq!(item.media_type, MediaType::Unknown);
        assert_eq!(item.description, FALLBACK_DESCRIPTION);
        assert_eq!(item.relevance, FALLBACK_RELEVANCE);
        assert_eq!(item.extra.get("score"), Some(&json!(3)));

        // The view never leaks back into the record
        let stored = serde_json::to_value(&record).unwrap();
        assert_eq!(stored["media_type"], json!("audio"));
        assert_eq!(stored["description"], Value::Null);
    }

    #[test]
    fn test_item_roundtrip() {
        let item = MediaItem::new("b.png", MediaType::Image, "Logo on white", "high")
            .with_extra("tags", json!(["brand"]));

        let record = CacheRecord::from(item.clone());
        assert_eq!(record.filename(), "b.png");
        assert_eq!(record.to_item(), item);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "filename": "b.png",
                "media_type": "image",
                "description": "Logo on white",
                "relevance": "high",
                "tags": ["brand"]
            })
        );
    }
}
