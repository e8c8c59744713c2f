use std::path::Path;
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::process::Command;

use crate::errors::TranscriptionError;
use crate::transcription::{Transcriber, Transcription, TranscriptionSegment, WordTiming};

// @module: Whisper CLI transcription engine

/// Transcription engine backed by the OpenAI Whisper command-line tool
///
/// Whisper is invoked as a subprocess with word-level timestamps enabled and
/// JSON output; the JSON is read back from a temporary directory. The task is
/// pinned to `transcribe` so the engine never silently translates lyrics.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    // @field: Model name (tiny, base, small, medium, large)
    model: String,

    // @field: Timeout for one transcription run
    timeout_secs: u64,
}

// Raw JSON shapes written by `whisper --output_format json`
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}

impl WhisperCli {
    // @creates: Engine wrapper for the given model
    pub fn new(model: impl Into<String>, timeout_secs: u64) -> Self {
        WhisperCli { model: model.into(), timeout_secs }
    }

    /// Model this engine was configured with
    pub fn model(&self) -> &str {
        &self.model
    }

    fn convert(output: WhisperOutput) -> Transcription {
        let segments = output
            .segments
            .into_iter()
            .map(|seg| TranscriptionSegment {
                start: seg.start,
                end: seg.end,
                text: seg.text,
                words: seg
                    .words
                    .into_iter()
                    .map(|w| WordTiming { text: w.word, start: w.start, end: w.end })
                    .collect(),
            })
            .collect();

        Transcription { language: output.language, segments }
    }

    /// Strip whisper's progress bars and download chatter from stderr,
    /// keeping only lines that look like actual errors.
    fn filter_whisper_stderr(stderr: &str) -> String {
        let meaningful: Vec<&str> = stderr
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return false;
                }
                // Progress bars render as percentage/frame lines
                !trimmed.starts_with('%')
                    && !trimmed.contains("frames/s")
                    && !trimmed.contains("it/s")
                    && !trimmed.starts_with("Detecting language")
                    && !trimmed.starts_with("Detected language")
            })
            .collect();

        if meaningful.is_empty() {
            "unknown whisper error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for WhisperCli {
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Transcription, TranscriptionError> {
        if !audio_path.exists() {
            return Err(TranscriptionError::ProcessFailed(format!(
                "Audio file does not exist: {:?}",
                audio_path
            )));
        }

        // Whisper writes <stem>.json into the output directory
        let output_dir = tempfile::tempdir().map_err(|e| {
            TranscriptionError::ProcessFailed(format!("Failed to create output dir: {}", e))
        })?;

        info!("Transcribing audio with whisper ({}): {:?}", self.model, audio_path);

        let mut args: Vec<String> = vec![
            audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.path().to_string_lossy().to_string(),
            "--word_timestamps".to_string(),
            "True".to_string(),
            // Pin the task so whisper never auto-translates the lyrics
            "--task".to_string(),
            "transcribe".to_string(),
            "--verbose".to_string(),
            "False".to_string(),
        ];

        if let Some(lang) = language {
            args.push("--language".to_string());
            args.push(lang.to_string());
        }

        let whisper_future = Command::new("whisper").args(&args).output();

        let timeout_duration = std::time::Duration::from_secs(self.timeout_secs);
        let result = tokio::select! {
            result = whisper_future => {
                result.map_err(|e| TranscriptionError::ProcessFailed(format!(
                    "Failed to execute whisper command: {}", e
                )))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(TranscriptionError::Timeout(self.timeout_secs));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let filtered = Self::filter_whisper_stderr(&stderr);
            return Err(TranscriptionError::ProcessFailed(filtered));
        }

        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let json_path = output_dir.path().join(format!("{}.json", stem));

        let content = std::fs::read_to_string(&json_path).map_err(|e| {
            TranscriptionError::ParseError(format!(
                "Failed to read whisper output {:?}: {}",
                json_path, e
            ))
        })?;

        let output: WhisperOutput = serde_json::from_str(&content)
            .map_err(|e| TranscriptionError::ParseError(e.to_string()))?;

        let transcription = Self::convert(output);

        if transcription.segments.is_empty() {
            // Legitimate for instrumental tracks; downstream handles it
            warn!("Whisper returned no segments for {:?}", audio_path);
        } else {
            debug!(
                "Whisper produced {} segments (language: {})",
                transcription.segments.len(),
                transcription.language.as_deref().unwrap_or("unknown")
            );
        }

        Ok(transcription)
    }

    async fn check_available(&self) -> Result<(), TranscriptionError> {
        let output = Command::new("whisper").arg("--help").output().await;

        match output {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(TranscriptionError::ModelUnavailable(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            )),
            Err(e) => Err(TranscriptionError::ProcessFailed(format!(
                "whisper binary not found: {}. Install it with: pip install openai-whisper",
                e
            ))),
        }
    }
}
