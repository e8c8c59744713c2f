/*!
 * Transcription engine boundary.
 *
 * This module defines the data model produced by a speech-recognition engine
 * and the trait every engine implementation must follow:
 * - `whisper`: OpenAI Whisper CLI invocation with word-level timestamps
 * - `mock`: deterministic in-memory engine for tests
 *
 * The rest of the pipeline only consumes `Transcription` values; it never
 * configures, retries, or cancels the engine itself.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::TranscriptionError;

/// A single word with the time span the engine heard it in
#[derive(Debug, Clone, PartialEq)]
pub struct WordTiming {
    /// The word text as reported, surrounding whitespace included
    pub text: String,

    /// Start of the word in seconds from the beginning of the audio
    pub start: f64,

    /// End of the word in seconds
    pub end: f64,
}

impl WordTiming {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        WordTiming { text: text.into(), start, end }
    }
}

/// A contiguous span of speech as reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionSegment {
    /// Segment start in seconds
    pub start: f64,

    /// Segment end in seconds
    pub end: f64,

    /// Full segment text
    pub text: String,

    /// Per-word timings. Empty when the engine degraded to
    /// segment-only granularity.
    pub words: Vec<WordTiming>,
}

impl TranscriptionSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>, words: Vec<WordTiming>) -> Self {
        TranscriptionSegment { start, end, text: text.into(), words }
    }
}

/// Complete engine output for one audio file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcription {
    /// Language the engine detected or was told to use
    pub language: Option<String>,

    /// Ordered segments; may be empty for instrumental audio
    pub segments: Vec<TranscriptionSegment>,
}

/// Common trait for all transcription engines
///
/// The engine call is a single opaque unit of work: implementations own
/// their process management and timeouts, callers own nothing but the result.
#[async_trait]
pub trait Transcriber: Send + Sync + Debug {
    /// Transcribe an audio file, optionally forcing a language
    ///
    /// # Arguments
    /// * `audio_path` - Path to the audio file (the vocal stem, not the full mix)
    /// * `language` - ISO language code to force, or None for auto-detection
    ///
    /// # Returns
    /// * `Result<Transcription, TranscriptionError>` - The timestamped transcription or an error
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Transcription, TranscriptionError>;

    /// Check that the engine can run at all (binary present, model loadable)
    ///
    /// # Returns
    /// * `Result<(), TranscriptionError>` - Ok if the engine is usable, or an error
    async fn check_available(&self) -> Result<(), TranscriptionError>;
}

pub mod whisper;
pub mod mock;
