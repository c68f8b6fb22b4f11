//! ffmpeg frame extraction.
//!
//! The pipeline does not decode video itself; it shells out to `ffmpeg`,
//! located on `PATH`, and has it write a numbered PNG sequence at the
//! configured resolution and frame rate. The invocation is strictly
//! sequential and fail-fast: a non-zero exit aborts the pipeline, carrying
//! the tail of ffmpeg's stderr.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::VideoSettings;
use crate::error::{AppResult, ReelError};

/// Printf-style file name ffmpeg expands per frame.
const FRAME_PATTERN: &str = "frame_%05d.png";

/// Runs `ffmpeg` to turn the input video into a PNG frame sequence.
pub struct FrameExtractor {
    input: PathBuf,
    frames_dir: PathBuf,
    width: u32,
    height: u32,
    fps: u32,
}

impl FrameExtractor {
    /// Create an extractor from the video settings.
    pub fn new(settings: &VideoSettings) -> Self {
        Self {
            input: settings.input.clone(),
            frames_dir: settings.frames_dir.clone(),
            width: settings.width,
            height: settings.height,
            fps: settings.fps,
        }
    }

    /// Extract frames, replacing any previous extraction.
    ///
    /// The frames directory is recreated from scratch so stale frames from
    /// an earlier, longer video cannot leak into the sequence. Returns the
    /// number of frames produced.
    pub fn extract(&self) -> AppResult<usize> {
        if !self.input.is_file() {
            return Err(ReelError::Extraction(format!(
                "input video '{}' does not exist",
                self.input.display()
            )));
        }
        if self.frames_dir.exists() && !self.frames_dir.is_dir() {
            return Err(ReelError::Extraction(format!(
                "frames path '{}' exists and is not a directory",
                self.frames_dir.display()
            )));
        }

        let ffmpeg = which::which("ffmpeg").map_err(ReelError::FfmpegNotFound)?;

        if self.frames_dir.exists() {
            std::fs::remove_dir_all(&self.frames_dir)?;
        }
        std::fs::create_dir_all(&self.frames_dir)?;

        tracing::info!(
            input = %self.input.display(),
            width = self.width,
            height = self.height,
            fps = self.fps,
            "Extracting frames"
        );

        let output = self.command(&ffmpeg).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReelError::Extraction(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr_tail(&stderr)
            )));
        }

        let count = std::fs::read_dir(&self.frames_dir)?
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
            })
            .count();
        if count == 0 {
            return Err(ReelError::EmptyFrameSequence(self.frames_dir.clone()));
        }

        tracing::info!(frames = count, "Extraction complete");
        Ok(count)
    }

    fn command(&self, ffmpeg: &Path) -> Command {
        let mut command = Command::new(ffmpeg);
        command
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(&self.input)
            .arg("-vf")
            .arg(format!("scale={}:{}", self.width, self.height))
            .arg("-r")
            .arg(self.fps.to_string())
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg(self.frames_dir.join(FRAME_PATTERN));
        command
    }
}

/// Last few lines of ffmpeg's stderr, enough to show the actual failure.
fn stderr_tail(stderr: &str) -> String {
    const MAX_LINES: usize = 8;
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    lines[start..].join("\n")
}
