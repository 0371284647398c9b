//! Media discovery.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::classify::classify;

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Recursively collect image and video files under `root`.
///
/// Hidden files and directories are skipped and the result is sorted by
/// path. A missing root yields an empty list.
pub fn discover_media(root: impl AsRef<Path>) -> Vec<PathBuf> {
    let root = root.as_ref();

    if !root.is_dir() {
        warn!(root = %root.display(), "Media directory not found");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|path| classify(path).is_media())
        .collect();

    files.sort();

    debug!(root = %root.display(), count = files.len(), "Discovered media files");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discovers_media_recursively() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("clips").join("a.mp4"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join(".hidden").join("c.mp4"));
        touch(&dir.path().join(".d.png"));

        let found = discover_media(dir.path());
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![PathBuf::from("b.png"), PathBuf::from("clips").join("a.mp4")]
        );
    }

    #[test]
    fn test_missing_root_is_empty() {
        assert!(discover_media("/definitely/not/a/dir").is_empty());
    }
}
