//! FFmpeg command builder and runner.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Verbosity passed to `-v`; only real failures reach stderr.
const LOG_LEVEL: &str = "error";

/// One non-interactive FFmpeg invocation: a single input, a single output.
///
/// Seeking happens on the input side so FFmpeg jumps straight to the offset
/// instead of decoding up to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    seek_secs: Option<f64>,
    max_frames: Option<u32>,
    filters: Vec<String>,
}

impl FfmpegCommand {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            seek_secs: None,
            max_frames: None,
            filters: Vec::new(),
        }
    }

    /// Start reading the input at `secs`.
    pub fn seek(mut self, secs: f64) -> Self {
        self.seek_secs = Some(secs);
        self
    }

    /// Stop after writing `count` video frames.
    pub fn frames(mut self, count: u32) -> Self {
        self.max_frames = Some(count);
        self
    }

    /// Append a video filter; several are chained with `,`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Arguments for `ffmpeg`, output file always overwritten.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-v".to_string(), LOG_LEVEL.to_string()];

        if let Some(secs) = self.seek_secs {
            args.extend(["-ss".to_string(), format!("{:.3}", secs)]);
        }
        args.extend(["-i".to_string(), self.input.to_string_lossy().into_owned()]);

        if !self.filters.is_empty() {
            args.extend(["-vf".to_string(), self.filters.join(",")]);
        }
        if let Some(count) = self.max_frames {
            args.extend(["-frames:v".to_string(), count.to_string()]);
        }

        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Runner for FFmpeg commands.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the child on timeout kills the process.
        let output = match self.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
                    .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!("FFmpeg timed out after {} seconds, killing process", secs);
                        return Err(MediaError::Timeout(secs));
                    }
                }
            }
            None => child.wait_with_output().await?,
        };

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                (!stderr.is_empty()).then_some(stderr),
                output.status.code(),
            ))
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_grab_args() {
        let args = FfmpegCommand::new("input.mp4", "frame.jpg")
            .seek(5.0)
            .frames(1)
            .filter("scale=768:-2")
            .build_args();

        assert_eq!(
            args,
            vec![
                "-y", "-v", "error", "-ss", "5.000", "-i", "input.mp4", "-vf", "scale=768:-2",
                "-frames:v", "1", "frame.jpg",
            ]
        );
    }

    #[test]
    fn test_plain_command_has_no_optional_args() {
        let args = FfmpegCommand::new("in.mov", "out.jpg").build_args();
        assert_eq!(args, vec!["-y", "-v", "error", "-i", "in.mov", "out.jpg"]);
    }

    #[test]
    fn test_filters_are_chained() {
        let args = FfmpegCommand::new("in.mov", "out.jpg")
            .filter("fps=1")
            .filter("scale=320:-2")
            .build_args();
        assert!(args.contains(&"fps=1,scale=320:-2".to_string()));
    }

    #[test]
    fn test_runner_timeout() {
        assert_eq!(FfmpegRunner::new().timeout_secs(), None);
        assert_eq!(FfmpegRunner::new().with_timeout(30).timeout_secs(), Some(30));
    }
}
