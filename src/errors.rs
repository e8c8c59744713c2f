/*!
 * Error types for the yakara application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to a transcription engine
#[derive(Error, Debug)]
pub enum TranscriptionError {
    /// Error when launching or running the engine process
    #[error("Transcription process failed: {0}")]
    ProcessFailed(String),

    /// Error when parsing the engine output
    #[error("Failed to parse transcription output: {0}")]
    ParseError(String),

    /// Engine did not finish within the configured timeout
    #[error("Transcription timed out after {0} seconds")]
    Timeout(u64),

    /// The requested model is not available
    #[error("Transcription model unavailable: {0}")]
    ModelUnavailable(String),
}

/// Errors that can occur during media acquisition and audio processing
#[derive(Error, Debug)]
pub enum MediaError {
    /// Error downloading from a URL
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// Error from an ffmpeg invocation
    #[error("ffmpeg failed: {0}")]
    FfmpegFailed(String),

    /// Error from the vocal separation step
    #[error("Vocal separation failed: {0}")]
    SeparationFailed(String),

    /// An external tool did not finish within the configured timeout
    #[error("{tool} timed out after {seconds} seconds")]
    Timeout {
        /// Name of the external tool
        tool: String,
        /// Configured timeout
        seconds: u64,
    },

    /// The input file does not exist or is not usable
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors that can occur when building or writing subtitle documents
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// A line with no words reached a renderer
    #[error("Karaoke line starting at {start_secs}s has no words")]
    EmptyLine {
        /// Start time of the offending line
        start_secs: f64,
    },

    /// A line has a non-positive duration
    #[error("Karaoke line has invalid time range: start {start_secs}s, end {end_secs}s")]
    InvalidTimeRange {
        /// Line start in seconds
        start_secs: f64,
        /// Line end in seconds
        end_secs: f64,
    },

    /// An unrecognized subtitle format was requested
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// Error while formatting document text
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// The target path cannot be written to
    #[error("Output path is not writable: {path:?} ({reason})")]
    OutputPath {
        /// The requested target path
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },

    /// One or more render/write operations failed in a multi-format request
    #[error("Subtitle write failed for {failed} of {requested} requested formats: {details}")]
    PartialWrite {
        /// Number of formats that failed
        failed: usize,
        /// Number of formats requested
        requested: usize,
        /// Per-format failure descriptions
        details: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the transcription engine
    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Error from media acquisition or audio processing
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Error from subtitle generation
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
