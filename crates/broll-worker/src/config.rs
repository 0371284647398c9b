//! Planner configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use broll_media::{FfmpegFrameExtractor, FfmpegRunner};
use broll_models::DEFAULT_FRAME_OFFSET_SECS;

/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default number of marketing-context characters embedded per file.
pub const DEFAULT_CONTEXT_EXCERPT_CHARS: usize = 2000;

/// Settings for the Gemini generative API.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API credential; a missing key fails each request, not startup
    pub api_key: Option<String>,
    /// Model name (e.g. "gemini-2.5-flash")
    pub model: String,
    /// REST base URL, overridable for tests
    pub base_url: String,
    /// Optional request timeout
    pub timeout: Option<Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout: std::env::var("BROLL_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
        }
    }
}

/// Planner configuration.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Directory scanned (recursively) for media files
    pub media_dir: PathBuf,
    /// Directory holding `<video stem>.txt` transcripts
    pub transcript_dir: PathBuf,
    /// Analysis cache file
    pub cache_path: PathBuf,
    /// Marketing context document
    pub context_path: PathBuf,
    /// Where to write suggestions, in addition to stdout
    pub suggestions_path: Option<PathBuf>,
    /// Characters of marketing context embedded in each analysis request
    pub context_excerpt_chars: usize,
    /// Offset at which video frames are grabbed
    pub frame_offset_secs: f64,
    /// Kill a frame grab that runs longer than this
    pub ffmpeg_timeout_secs: Option<u64>,
    /// Generative API settings
    pub gemini: GeminiConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from("media"),
            transcript_dir: PathBuf::from("transcripts"),
            cache_path: PathBuf::from("media_analysis.json"),
            context_path: PathBuf::from("marketing_context.txt"),
            suggestions_path: None,
            context_excerpt_chars: DEFAULT_CONTEXT_EXCERPT_CHARS,
            frame_offset_secs: DEFAULT_FRAME_OFFSET_SECS,
            ffmpeg_timeout_secs: None,
            gemini: GeminiConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            media_dir: std::env::var("BROLL_MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            transcript_dir: std::env::var("BROLL_TRANSCRIPT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("transcripts")),
            cache_path: std::env::var("BROLL_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media_analysis.json")),
            context_path: std::env::var("BROLL_CONTEXT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("marketing_context.txt")),
            suggestions_path: std::env::var("BROLL_SUGGESTIONS_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            context_excerpt_chars: std::env::var("BROLL_CONTEXT_EXCERPT_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONTEXT_EXCERPT_CHARS),
            frame_offset_secs: std::env::var("BROLL_FRAME_OFFSET_SECS")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .unwrap_or(DEFAULT_FRAME_OFFSET_SECS),
            ffmpeg_timeout_secs: std::env::var("BROLL_FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0),
            gemini: GeminiConfig::from_env(),
        }
    }

    /// FFmpeg frame grabber at the configured offset and timeout.
    pub fn frame_extractor(&self) -> FfmpegFrameExtractor {
        let runner = match self.ffmpeg_timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        };
        FfmpegFrameExtractor::new(self.frame_offset_secs).with_runner(runner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.cache_path, PathBuf::from("media_analysis.json"));
        assert_eq!(config.context_excerpt_chars, 2000);
        assert!((config.frame_offset_secs - 5.0).abs() < f64::EPSILON);
        assert!(config.gemini.api_key.is_none());
        assert!(config.suggestions_path.is_none());
    }

    #[test]
    fn test_frame_extractor_carries_offset_and_timeout() {
        let config = PlannerConfig {
            frame_offset_secs: 1.5,
            ffmpeg_timeout_secs: Some(20),
            ..Default::default()
        };

        let extractor = config.frame_extractor();
        assert!((extractor.offset_secs() - 1.5).abs() < f64::EPSILON);
        assert_eq!(extractor.runner().timeout_secs(), Some(20));

        let untimed = PlannerConfig::default().frame_extractor();
        assert_eq!(untimed.runner().timeout_secs(), None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let gemini = GeminiConfig {
            api_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", gemini);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
