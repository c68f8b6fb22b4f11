//! Custom error types for the application.
//!
//! This module defines the primary error type, `ReelError`, for the entire
//! pipeline. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of failures the tool can hit,
//! from I/O and configuration issues to malformed save files.
//!
//! ## Error Hierarchy
//!
//! `ReelError` is an enum that consolidates the pipeline's error sources:
//!
//! - **`Config`**: Wraps errors from `figment`, typically file parsing or
//!   format issues in the configuration files.
//! - **`Configuration`**: Represents semantic errors in the configuration,
//!   values that parse fine but are logically invalid (e.g. a zero frame
//!   rate). These are caught during the validation step.
//! - **`Io`**: Wraps standard `std::io::Error`, covering all file I/O.
//! - **`Image`**: Wraps `image::ImageError` from frame decoding.
//! - **`Extraction`**: The external `ffmpeg` invocation failed; carries the
//!   tail of its stderr so the cause is visible without re-running.
//! - **`Format`**: The save file is malformed (bad magic, truncated body,
//!   invalid counts). Reading never panics; it returns this instead.
//!
//! By using `#[from]`, `ReelError` can be seamlessly created from underlying
//! error types, so the `?` operator works throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, ReelError>;

/// Unified error type for every stage of the pipeline.
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ffmpeg not found on PATH")]
    FfmpegNotFound(#[source] which::Error),

    #[error("Frame extraction failed: {0}")]
    Extraction(String),

    #[error("No frames found in '{0}'")]
    EmptyFrameSequence(PathBuf),

    #[error("'{path}': frame is {got_width}x{got_height}, expected {want_width}x{want_height}")]
    FrameSizeMismatch {
        path: PathBuf,
        got_width: u32,
        got_height: u32,
        want_width: u32,
        want_height: u32,
    },

    #[error("Malformed save file: {0}")]
    Format(String),

    #[error("Save file does not define component type '{0}'")]
    UnknownComponentType(String),

    #[error("Value out of range for the save format: {0}")]
    IntRange(#[from] std::num::TryFromIntError),

    #[error("Staging error: {0}")]
    Staging(String),
}
