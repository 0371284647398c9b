//! Still-frame extraction.
//!
//! Videos are represented to the analysis service by a single frame grabbed
//! at a fixed offset. The grab sits behind [`FrameExtractor`] so callers can
//! swap FFmpeg for a stub.

use std::path::Path;

use async_trait::async_trait;
use broll_models::DEFAULT_FRAME_OFFSET_SECS;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Width frames are scaled down to before being sent inline.
pub const FRAME_SCALE_WIDTH: u32 = 768;

/// MIME type of extracted frames.
pub const FRAME_MIME_TYPE: &str = "image/jpeg";

/// An image payload ready to be sent inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl StillImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Capability to pull a representative still image out of a video.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Returns `Ok(None)` when the video yields no frame (e.g. shorter than
    /// the offset).
    async fn extract_frame(&self, video_path: &Path) -> MediaResult<Option<StillImage>>;
}

/// Frame extractor that never produces a frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFrameExtractor;

#[async_trait]
impl FrameExtractor for NoopFrameExtractor {
    async fn extract_frame(&self, _video_path: &Path) -> MediaResult<Option<StillImage>> {
        Ok(None)
    }
}

/// Frame extractor backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    offset_secs: f64,
    runner: FfmpegRunner,
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_OFFSET_SECS)
    }
}

impl FfmpegFrameExtractor {
    pub fn new(offset_secs: f64) -> Self {
        Self {
            offset_secs,
            runner: FfmpegRunner::new(),
        }
    }

    pub fn with_runner(mut self, runner: FfmpegRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn offset_secs(&self) -> f64 {
        self.offset_secs
    }

    pub fn runner(&self) -> &FfmpegRunner {
        &self.runner
    }

    /// Build the frame-grab command for a video.
    pub fn command(&self, video_path: &Path, output_path: &Path) -> FfmpegCommand {
        let filter = format!("scale='min({},iw)':-2", FRAME_SCALE_WIDTH);

        FfmpegCommand::new(video_path, output_path)
            .seek(self.offset_secs)
            .frames(1)
            .filter(filter)
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frame(&self, video_path: &Path) -> MediaResult<Option<StillImage>> {
        if !video_path.exists() {
            return Err(MediaError::FileNotFound(video_path.to_path_buf()));
        }

        let workdir = tempfile::Builder::new().prefix("broll-frame").tempdir()?;
        let output_path = workdir.path().join("frame.jpg");

        self.runner
            .run(&self.command(video_path, &output_path))
            .await?;

        // FFmpeg exits cleanly without writing anything when the seek lands
        // past the end of the stream.
        if !output_path.exists() {
            debug!(video = %video_path.display(), "No frame at offset");
            return Ok(None);
        }

        let bytes = tokio::fs::read(&output_path).await?;
        if bytes.is_empty() {
            return Ok(None);
        }

        debug!(
            video = %video_path.display(),
            bytes = bytes.len(),
            "Extracted still frame"
        );
        Ok(Some(StillImage::new(bytes, FRAME_MIME_TYPE)))
    }
}
