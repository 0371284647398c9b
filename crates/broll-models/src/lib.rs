//! Shared data models for the B-roll planner.
//!
//! This crate provides Serde-serializable types for:
//! - Analyzed media items and their media kinds
//! - B-roll overlay suggestions
//! - Run identifiers used for structured logging

pub mod media;
pub mod run;
pub mod suggestion;

// Re-export common types
pub use media::{
    MediaItem, MediaType, DEFAULT_FRAME_OFFSET_SECS, FALLBACK_DESCRIPTION, FALLBACK_RELEVANCE,
};
pub use run::RunId;
pub use suggestion::{BrollOverlay, BrollSuggestion, SuggestionSet};
