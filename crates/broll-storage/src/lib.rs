//! Incremental media-analysis cache.
//!
//! This crate provides:
//! - Fail-soft loading of previously analyzed records, kept verbatim
//! - Filename-keyed filtering of discovered files down to unseen ones
//! - Order-preserving merge of cached and newly analyzed items
//! - Best-effort replacement of the cache file via temp file + rename

pub mod analysis_cache;
pub mod error;
pub mod record;

pub use analysis_cache::{base_name, cached_filenames, merge, unseen, AnalysisCache, CacheUpdate};
pub use error::{StorageError, StorageResult};
pub use record::CacheRecord;
