//! Content extraction for analysis requests.
//!
//! Produces at most one still image per file (the file itself for images, a
//! grabbed frame for videos) and, for videos, the transcript stored next to
//! it in the transcript directory. Nothing here is fatal: whatever cannot be
//! produced is simply left out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use broll_models::MediaType;
use tracing::{debug, warn};

use crate::classify::image_mime_type;
use crate::frame::{FrameExtractor, StillImage};

/// Extension of transcript files.
pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// Whatever could be pulled out of a file for analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub image: Option<StillImage>,
    pub transcript: Option<String>,
}

impl ExtractedContent {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.transcript.is_none()
    }
}

/// Extracts still images and transcripts from classified files.
#[derive(Clone)]
pub struct ContentExtractor {
    frames: Arc<dyn FrameExtractor>,
    transcript_dir: Option<PathBuf>,
}

impl ContentExtractor {
    pub fn new(frames: Arc<dyn FrameExtractor>, transcript_dir: Option<PathBuf>) -> Self {
        Self {
            frames,
            transcript_dir,
        }
    }

    /// Extract content for a file of the given kind.
    pub async fn extract(&self, path: &Path, kind: MediaType) -> ExtractedContent {
        match kind {
            MediaType::Image => ExtractedContent {
                image: load_image(path).await,
                transcript: None,
            },
            MediaType::Video => ExtractedContent {
                image: self.grab_frame(path).await,
                transcript: self.load_transcript(path).await,
            },
            MediaType::Other | MediaType::Unknown => ExtractedContent::default(),
        }
    }

    /// Transcript location for a video: `<transcript_dir>/<stem>.txt`.
    pub fn transcript_path(&self, video_path: &Path) -> Option<PathBuf> {
        let dir = self.transcript_dir.as_ref()?;
        let mut name = video_path.file_stem()?.to_os_string();
        name.push(".");
        name.push(TRANSCRIPT_EXTENSION);
        Some(dir.join(name))
    }

    async fn grab_frame(&self, path: &Path) -> Option<StillImage> {
        match self.frames.extract_frame(path).await {
            Ok(frame) => frame,
            Err(e) if e.is_tool_missing() => {
                debug!(file = %path.display(), "FFmpeg unavailable, skipping frame");
                None
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Frame extraction failed");
                None
            }
        }
    }

    async fn load_transcript(&self, video_path: &Path) -> Option<String> {
        let transcript_path = self.transcript_path(video_path)?;

        match tokio::fs::read_to_string(&transcript_path).await {
            Ok(text) if text.trim().is_empty() => None,
            Ok(text) => {
                debug!(path = %transcript_path.display(), "Loaded transcript");
                Some(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %transcript_path.display(), error = %e, "Failed to read transcript");
                None
            }
        }
    }
}

async fn load_image(path: &Path) -> Option<StillImage> {
    let mime_type = image_mime_type(path)?;

    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => None,
        Ok(bytes) => Some(StillImage::new(bytes, mime_type)),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Failed to read image");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MediaError, MediaResult};
    use crate::frame::NoopFrameExtractor;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedFrame;

    #[async_trait]
    impl FrameExtractor for FixedFrame {
        async fn extract_frame(&self, _video_path: &Path) -> MediaResult<Option<StillImage>> {
            Ok(Some(StillImage::new(vec![0xff, 0xd8], "image/jpeg")))
        }
    }

    struct BrokenFrame;

    #[async_trait]
    impl FrameExtractor for BrokenFrame {
        async fn extract_frame(&self, _video_path: &Path) -> MediaResult<Option<StillImage>> {
            Err(MediaError::ffmpeg_failed("boom", None, Some(1)))
        }
    }

    #[tokio::test]
    async fn test_image_is_read_directly() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("b.png");
        tokio::fs::write(&image, b"png-bytes").await.unwrap();

        let extractor = ContentExtractor::new(Arc::new(NoopFrameExtractor), None);
        let content = extractor.extract(&image, MediaType::Image).await;

        let still = content.image.expect("image payload");
        assert_eq!(still.bytes, b"png-bytes");
        assert_eq!(still.mime_type, "image/png");
        assert!(content.transcript.is_none());
    }

    #[tokio::test]
    async fn test_video_gets_frame_and_transcript() {
        let dir = TempDir::new().unwrap();
        let transcripts = dir.path().join("transcripts");
        tokio::fs::create_dir_all(&transcripts).await.unwrap();
        tokio::fs::write(transcripts.join("a.txt"), "hello there").await.unwrap();

        let extractor = ContentExtractor::new(Arc::new(FixedFrame), Some(transcripts));
        let content = extractor
            .extract(&dir.path().join("nested").join("a.mp4"), MediaType::Video)
            .await;

        assert!(content.image.is_some());
        assert_eq!(content.transcript.as_deref(), Some("hello there"));
    }

    #[tokio::test]
    async fn test_video_without_frame_or_transcript() {
        let dir = TempDir::new().unwrap();
        let extractor =
            ContentExtractor::new(Arc::new(BrokenFrame), Some(dir.path().to_path_buf()));
        let content = extractor
            .extract(&dir.path().join("a.mp4"), MediaType::Video)
            .await;

        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_other_files_yield_nothing() {
        let extractor = ContentExtractor::new(Arc::new(FixedFrame), None);
        let content = extractor
            .extract(Path::new("notes.txt"), MediaType::Other)
            .await;
        assert!(content.is_empty());
    }

    #[test]
    fn test_transcript_path() {
        let extractor =
            ContentExtractor::new(Arc::new(NoopFrameExtractor), Some(PathBuf::from("/t")));
        assert_eq!(
            extractor.transcript_path(Path::new("/media/sub/clip.final.mp4")),
            Some(PathBuf::from("/t/clip.final.txt"))
        );

        let no_dir = ContentExtractor::new(Arc::new(NoopFrameExtractor), None);
        assert!(no_dir.transcript_path(Path::new("a.mp4")).is_none());
    }
}
