/*!
 * Mock transcription engine for testing.
 *
 * This module provides a mock engine that simulates different behaviors:
 * - `MockTranscriber::with_segments(..)` - Succeeds with preset segments
 * - `MockTranscriber::empty()` - Succeeds with no segments (instrumental)
 * - `MockTranscriber::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::TranscriptionError;
use crate::transcription::{Transcriber, Transcription, TranscriptionSegment};

/// Behavior mode for the mock engine
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Succeeds with the given segments
    Segments(Vec<TranscriptionSegment>),
    /// Succeeds with an empty transcription
    Empty,
    /// Always fails with a process error
    Failing,
    /// Simulates a slow engine (for timeout testing)
    Slow {
        /// Delay before responding
        delay_ms: u64,
    },
}

/// Mock engine for testing pipeline behavior without external binaries
#[derive(Debug)]
pub struct MockTranscriber {
    /// Behavior mode
    behavior: MockBehavior,
    /// Language reported back by the mock
    language: Option<String>,
    /// Number of transcribe calls made
    call_count: Arc<AtomicUsize>,
}

impl MockTranscriber {
    /// Create a new mock engine with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            language: Some("en".to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock that succeeds with the given segments
    pub fn with_segments(segments: Vec<TranscriptionSegment>) -> Self {
        Self::new(MockBehavior::Segments(segments))
    }

    /// Create a mock that returns an empty transcription
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that responds slowly
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Override the language reported by the mock
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Number of transcribe calls made against this mock
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        _audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Transcription, TranscriptionError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Segments(segments) => Ok(Transcription {
                language: language
                    .map(|l| l.to_string())
                    .or_else(|| self.language.clone()),
                segments: segments.clone(),
            }),
            MockBehavior::Empty => Ok(Transcription {
                language: self.language.clone(),
                segments: Vec::new(),
            }),
            MockBehavior::Failing => Err(TranscriptionError::ProcessFailed(
                "Mock engine configured to fail".to_string(),
            )),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                Ok(Transcription {
                    language: self.language.clone(),
                    segments: Vec::new(),
                })
            }
        }
    }

    async fn check_available(&self) -> Result<(), TranscriptionError> {
        match &self.behavior {
            MockBehavior::Failing => Err(TranscriptionError::ModelUnavailable(
                "Mock engine configured to fail".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
