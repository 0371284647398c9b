//! B-roll planning worker.
//!
//! This crate provides:
//! - Per-file media analysis with deterministic fallback
//! - Gemini transport for analysis and suggestion requests
//! - B-roll suggestion requests with an empty default
//! - The end-to-end planner run over the incremental analysis cache

pub mod analyzer;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod pipeline;
pub mod suggestions;

pub use analyzer::{coerce_item, excerpt, DescribeRequest, ItemAnalyzer, MediaDescriber};
pub use config::{GeminiConfig, PlannerConfig};
pub use error::{WorkerError, WorkerResult};
pub use gemini::GeminiClient;
pub use logging::RunLogger;
pub use pipeline::{read_context, BrollPipeline, RunOutcome};
pub use suggestions::{coerce_suggestions, SuggestionRequester, SuggestionSource};
