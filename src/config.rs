//! Configuration system using Figment.
//!
//! This module provides strongly-typed configuration loading for the
//! pipeline. Configuration is loaded from:
//! 1. a TOML file (`config/default.toml` unless overridden with `--config`)
//! 2. environment variables (prefixed with `LOGICREEL_`, with `__`
//!    separating nesting levels, e.g. `LOGICREEL_VIDEO__FPS=15`)
//!
//! # Example
//! ```no_run
//! use logicreel::config::Settings;
//!
//! # fn main() -> Result<(), logicreel::error::ReelError> {
//! let settings = Settings::load(None)?;
//! println!("Input video: {}", settings.video.input.display());
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppResult, ReelError};
use crate::validation;

/// Default configuration file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Video input and frame extraction settings
    pub video: VideoSettings,
    /// Circuit encoding settings
    #[serde(default)]
    pub encode: EncodeSettings,
    /// Game save staging settings
    pub staging: StagingSettings,
}

/// Video input and frame extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Path of the source video handed to ffmpeg
    pub input: PathBuf,
    /// Directory the numbered PNG frames are extracted into
    #[serde(default = "default_frames_dir")]
    pub frames_dir: PathBuf,
    /// Horizontal resolution of the generated screen, in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Vertical resolution of the generated screen, in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Frame rate the video is resampled to
    #[serde(default = "default_fps")]
    pub fps: u32,
}

/// Circuit encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeSettings {
    /// Luma cutoff above which a pixel counts as lit (0-255)
    #[serde(default = "default_luma_threshold")]
    pub luma_threshold: u8,
    /// Simulation ticks each timing delayer holds, i.e. half a frame period
    #[serde(default = "default_frame_ticks")]
    pub frame_ticks: u32,
    /// Frames between forced pixel-net breaks
    #[serde(default = "default_chunk_interval")]
    pub chunk_interval: usize,
    /// RGB color of the generated row boards
    #[serde(default = "default_board_color")]
    pub board_color: [u8; 3],
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            luma_threshold: default_luma_threshold(),
            frame_ticks: default_frame_ticks(),
            chunk_interval: default_chunk_interval(),
            board_color: default_board_color(),
        }
    }
}

/// Game save staging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingSettings {
    /// The game's saves directory. When absent, the default Steam install
    /// location under the user's home directory is used.
    #[serde(default)]
    pub saves_dir: Option<PathBuf>,
    /// World directory copied as the starting point for the generated save
    pub template_dir: PathBuf,
    /// Name of the generated world (its directory under `saves_dir`)
    #[serde(default = "default_world_name")]
    pub world_name: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_frames_dir() -> PathBuf {
    PathBuf::from("frames")
}

fn default_width() -> u32 {
    96
}

fn default_height() -> u32 {
    72
}

fn default_fps() -> u32 {
    30
}

fn default_luma_threshold() -> u8 {
    127
}

fn default_frame_ticks() -> u32 {
    10
}

fn default_chunk_interval() -> usize {
    200
}

fn default_board_color() -> [u8; 3] {
    [51, 51, 51]
}

fn default_world_name() -> String {
    "logicreel".to_string()
}

impl Settings {
    /// Load configuration from the default file and environment variables.
    ///
    /// Environment variables can override configuration with prefix
    /// `LOGICREEL_`. Example: `LOGICREEL_VIDEO__FPS=15`.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let settings: Settings = Figment::new()
            .merge(Toml::file_exact(
                path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH)),
            ))
            .merge(Env::prefixed("LOGICREEL_").split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration after loading.
    ///
    /// Catches values that deserialize fine but are semantically invalid.
    pub fn validate(&self) -> AppResult<()> {
        let check = |result: Result<(), &'static str>, field: &str| {
            result.map_err(|msg| ReelError::Configuration(format!("{field}: {msg}")))
        };

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ReelError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        check(validation::is_nonzero(self.video.width), "video.width")?;
        check(validation::is_nonzero(self.video.height), "video.height")?;
        check(validation::is_nonzero(self.video.fps), "video.fps")?;
        check(
            validation::is_nonzero(self.encode.frame_ticks),
            "encode.frame_ticks",
        )?;
        check(
            validation::is_nonzero(self.encode.chunk_interval),
            "encode.chunk_interval",
        )?;
        check(
            validation::is_bare_name(&self.staging.world_name),
            "staging.world_name",
        )?;
        Ok(())
    }
}
