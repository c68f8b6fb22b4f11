//! # logicreel Core Library
//!
//! This crate is the core library for the `logicreel` tool. It converts a
//! video into a playable "video player" circuit inside a voxel logic game
//! save: every pixel of the video becomes an output socket driven by chains
//! of delayer components, and every frame becomes a wave travelling down a
//! per-row timing chain.
//!
//! ## Crate Structure
//!
//! The library is organized into several modules, each with a distinct
//! responsibility:
//!
//! - **`config`**: Defines the structures for loading and validating the
//!   pipeline configuration from TOML files and environment variables. See
//!   [`config::Settings`].
//! - **`error`**: Defines the custom [`error::ReelError`] enum for
//!   centralized error handling across the pipeline.
//! - **`extract`**: Shells out to `ffmpeg` to turn the input video into a
//!   numbered PNG frame sequence at the configured resolution and rate.
//! - **`frames`**: Loads the extracted frames as 1-bit matrices, with the
//!   thresholding and vertical flip the encoder expects.
//! - **`save`**: Reader and writer for the game's binary circuit save
//!   format, plus the in-memory model ([`save::SaveFile`]).
//! - **`encode`**: The frame-to-circuit injection algorithm: delta encoding,
//!   timing chains, pixel nets and net chunking.
//! - **`staging`**: Manages the world directory inside the game's saves
//!   folder (template copy, metadata file, replacement of a prior run).
//! - **`telemetry`**: `tracing` subscriber setup shared by the binary.
//! - **`validation`**: Small parameter validation helpers used by `config`.

pub mod config;
pub mod encode;
pub mod error;
pub mod extract;
pub mod frames;
pub mod save;
pub mod staging;
pub mod telemetry;
pub mod validation;
