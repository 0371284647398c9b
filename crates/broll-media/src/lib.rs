//! Media inspection for the B-roll planner.
//!
//! This crate provides:
//! - Extension-based media classification
//! - Recursive media discovery
//! - Type-safe FFmpeg command building
//! - Still-frame extraction behind a swappable capability
//! - Content extraction (still image + transcript) for analysis requests

pub mod classify;
pub mod command;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod frame;

pub use classify::{classify, image_mime_type};
pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use discovery::discover_media;
pub use error::{MediaError, MediaResult};
pub use extract::{ContentExtractor, ExtractedContent};
pub use frame::{FfmpegFrameExtractor, FrameExtractor, NoopFrameExtractor, StillImage};
