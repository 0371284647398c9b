//! Analysis cache.
//!
//! The cache file is a JSON array of records and is the only record of which
//! files have been analyzed. Identity is the base file name: a file is never
//! analyzed twice under the same name, even when its content or directory
//! changes.
//!
//! Records are carried as [`CacheRecord`]s, so whatever a previous run (or a
//! person) wrote is persisted back value for value, even when it would not fit
//! [`MediaItem`]. Only a document that is not an array is treated as corrupt;
//! an individual record without a string `filename` has no identity and is
//! dropped.
//!
//! Every operation here degrades instead of failing. A missing or corrupt
//! cache loads as empty, and a failed write is logged and reported as
//! `false` so the caller can still use the in-memory result.
//!
//! # Usage
//!
//! ```ignore
//! let cache = AnalysisCache::new("media_analysis.json");
//! let update = cache.update(&discovered, |path| analyze(path)).await;
//! println!("{} items, {} new", update.len(), update.new_count());
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};

use broll_models::MediaItem;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::record::CacheRecord;

/// Persistent, filename-keyed record of analyzed media.
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    path: PathBuf,
}

/// Outcome of one cache update pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheUpdate {
    records: Vec<CacheRecord>,
    new_count: usize,
    persisted: bool,
}

impl CacheUpdate {
    /// Cached records followed by newly analyzed ones.
    pub fn records(&self) -> &[CacheRecord] {
        &self.records
    }

    /// Typed view of every record.
    pub fn items(&self) -> Vec<MediaItem> {
        self.records.iter().map(CacheRecord::to_item).collect()
    }

    /// Records analyzed during this pass.
    pub fn new_records(&self) -> &[CacheRecord] {
        let start = self.records.len().saturating_sub(self.new_count);
        &self.records[start..]
    }

    /// Number of records analyzed during this pass.
    pub fn new_count(&self) -> usize {
        self.new_count
    }

    /// Whether the merged set reached disk.
    pub fn persisted(&self) -> bool {
        self.persisted
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AnalysisCache {
    /// Create a cache backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached records.
    pub async fn try_load(&self) -> StorageResult<Vec<CacheRecord>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let entries = match serde_json::from_str::<Value>(&raw)? {
            Value::Array(entries) => entries,
            _ => return Err(StorageError::malformed("expected a JSON array of records")),
        };

        let total = entries.len();
        let records: Vec<CacheRecord> = entries
            .into_iter()
            .filter_map(CacheRecord::from_value)
            .collect();

        if records.len() != total {
            warn!(
                path = %self.path.display(),
                dropped = total - records.len(),
                "Dropping cache records without a string filename"
            );
        }

        let distinct = cached_filenames(&records).len();
        if distinct != records.len() {
            warn!(
                path = %self.path.display(),
                records = records.len(),
                distinct,
                "Analysis cache contains duplicate filenames"
            );
        }

        Ok(records)
    }

    /// Read the cached records, treating any failure as an empty cache.
    pub async fn load(&self) -> Vec<CacheRecord> {
        match self.try_load().await {
            Ok(records) => {
                info!(path = %self.path.display(), records = records.len(), "Loaded analysis cache");
                records
            }
            Err(e) if e.is_not_found() => {
                info!(path = %self.path.display(), "No analysis cache yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Analysis cache unreadable, starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Replace the cache file with `records`.
    ///
    /// The JSON is written to a sibling temp file first and renamed over the
    /// target, so a reader sees either the old or the new content.
    pub async fn try_persist(&self, records: &[CacheRecord]) -> StorageResult<()> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| StorageError::invalid_path(self.path.display().to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(records)?;

        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, json.as_bytes()).await?;

        if let Err(e) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(path = %self.path.display(), records = records.len(), "Analysis cache written");
        Ok(())
    }

    /// Replace the cache file with `records`, logging instead of failing.
    ///
    /// Returns whether the write succeeded.
    pub async fn persist(&self, records: &[CacheRecord]) -> bool {
        match self.try_persist(records).await {
            Ok(()) => {
                info!(path = %self.path.display(), records = records.len(), "Persisted analysis cache");
                true
            }
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to persist analysis cache"
                );
                false
            }
        }
    }

    /// Analyze every unseen file in `discovered` and persist the merged set.
    ///
    /// Files are analyzed one at a time in input order. `analyze` must always
    /// produce an item (falling back when analysis fails) so that every
    /// unseen file lands in the cache. A base name is analyzed at most once
    /// per pass even if several discovered paths share it.
    pub async fn update<P, F, Fut>(&self, discovered: &[P], mut analyze: F) -> CacheUpdate
    where
        P: AsRef<Path>,
        F: FnMut(PathBuf) -> Fut,
        Fut: Future<Output = MediaItem>,
    {
        let cached = self.load().await;
        let pending = unseen(discovered, &cached);

        info!(
            discovered = discovered.len(),
            cached = cached.len(),
            unseen = pending.len(),
            "Analysis cache filtered discovered files"
        );

        let mut analyzed_names: HashSet<String> = HashSet::new();
        let mut new_items = Vec::with_capacity(pending.len());

        for path in pending {
            let name = base_name(&path);
            if !analyzed_names.insert(name.clone()) {
                warn!(
                    file = %path.display(),
                    filename = %name,
                    "Skipping file whose name was already analyzed this run"
                );
                continue;
            }

            new_items.push(analyze(path).await);
        }

        let new_count = new_items.len();
        let records = merge(cached, new_items);
        let persisted = self.persist(&records).await;

        CacheUpdate {
            records,
            new_count,
            persisted,
        }
    }
}

/// Base file name of a path, the cache's identity key.
///
/// Returns an empty string for paths without a file name.
pub fn base_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Set of filenames present in `records`.
pub fn cached_filenames(records: &[CacheRecord]) -> HashSet<&str> {
    records.iter().map(CacheRecord::filename).collect()
}

/// Discovered paths whose base name is not among the cached filenames.
///
/// Input order is preserved. Matching is on the base name only, so a file
/// in another directory that shares a cached name counts as analyzed.
pub fn unseen<P: AsRef<Path>>(discovered: &[P], cached: &[CacheRecord]) -> Vec<PathBuf> {
    let known = cached_filenames(cached);

    discovered
        .iter()
        .map(AsRef::<Path>::as_ref)
        .filter(|path| !known.contains(base_name(path).as_str()))
        .map(Path::to_path_buf)
        .collect()
}

/// Cached records followed by newly analyzed items.
///
/// No de-duplication happens here; callers filter with [`unseen`] first.
pub fn merge(cached: Vec<CacheRecord>, new_items: Vec<MediaItem>) -> Vec<CacheRecord> {
    let mut merged = cached;
    merged.extend(new_items.into_iter().map(CacheRecord::from));
    merged
}
