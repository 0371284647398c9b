//! B-roll suggestion models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single B-roll overlay placed on top of a primary clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BrollOverlay {
    /// Filename of the B-roll clip or image to overlay
    #[serde(alias = "broll", alias = "image")]
    pub clip: String,

    /// Start of the overlay within the primary clip (seconds)
    #[serde(alias = "start_time")]
    pub start: f64,

    /// How long the overlay stays on screen (seconds)
    pub duration: f64,

    /// Why this overlay fits here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BrollOverlay {
    /// Create a new overlay.
    pub fn new(clip: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            clip: clip.into(),
            start,
            duration,
            reason: None,
        }
    }

    /// End of the overlay (seconds).
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Validate the overlay.
    pub fn validate(&self) -> Result<(), String> {
        if self.clip.trim().is_empty() {
            return Err("Overlay clip must be specified".to_string());
        }

        if !self.start.is_finite() || self.start < 0.0 {
            return Err(format!("Overlay start must be non-negative, got {}", self.start));
        }

        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(format!("Overlay duration must be positive, got {}", self.duration));
        }

        Ok(())
    }
}

/// Overlay recommendations for one primary clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BrollSuggestion {
    /// Filename of the clip the overlays apply to
    pub filename: String,

    /// Overlays in the order they were suggested
    #[serde(default, alias = "broll")]
    pub overlays: Vec<BrollOverlay>,
}

impl BrollSuggestion {
    pub fn new(filename: impl Into<String>, overlays: Vec<BrollOverlay>) -> Self {
        Self {
            filename: filename.into(),
            overlays,
        }
    }

    /// Drop overlays that fail validation, returning the rejection messages.
    pub fn retain_valid(&mut self) -> Vec<String> {
        let mut rejected = Vec::new();
        self.overlays.retain(|overlay| match overlay.validate() {
            Ok(()) => true,
            Err(reason) => {
                rejected.push(reason);
                false
            }
        });
        rejected
    }
}

/// Envelope the suggestion service answers with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionSet {
    #[serde(default)]
    pub suggestions: Vec<BrollSuggestion>,
}
