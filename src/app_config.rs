use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::subtitle::ass::AssStyle;
use crate::subtitle::coordinator::SubtitleFormat;
use crate::subtitle::karaoke::LinePolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Folder the final audio/video and subtitles land in
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for intermediate files (download, stems, mix)
    #[serde(default = "default_temp_folder")]
    pub temp_folder: String,

    /// Keep intermediate files after a successful run
    #[serde(default)]
    pub keep_temp_files: bool,

    /// Which subtitle document(s) to produce
    #[serde(default)]
    pub subtitle_format: SubtitleFormat,

    /// Final media output kind
    #[serde(default)]
    pub output_kind: OutputKind,

    /// Limits for grouping words into subtitle lines
    #[serde(default)]
    pub line_policy: LinePolicy,

    /// ASS style parameters
    #[serde(default)]
    pub ass_style: AssStyle,

    /// Transcription engine config
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Vocal separation config
    #[serde(default)]
    pub separation: SeparationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Final media output kind
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    // @kind: Audio only
    Mp3,
    // @kind: Video with the KTV mix muxed in
    #[default]
    Mp4,
}

impl OutputKind {
    // @returns: Output file extension
    pub fn extension(&self) -> &str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "mp4" => Ok(Self::Mp4),
            _ => Err(anyhow!("Invalid output kind: {}", s)),
        }
    }
}

/// Transcription engine configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranscriptionConfig {
    /// Whisper model name (tiny, base, small, medium, large)
    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// ISO language code to force, or "auto" for detection
    #[serde(default = "default_transcription_language")]
    pub language: String,

    /// Timeout for one transcription run in seconds
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl TranscriptionConfig {
    /// The language to pass to the engine, None for auto-detection
    pub fn forced_language(&self) -> Option<&str> {
        if self.language == "auto" { None } else { Some(&self.language) }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: default_transcription_model(),
            language: default_transcription_language(),
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

/// Vocal separation configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeparationConfig {
    /// Demucs model name
    #[serde(default = "default_separation_model")]
    pub model: String,

    /// Timeout for one separation run in seconds
    #[serde(default = "default_separation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            model: default_separation_model(),
            timeout_secs: default_separation_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_output_folder() -> String {
    "./output".to_string()
}

fn default_temp_folder() -> String {
    "./temp".to_string()
}

fn default_transcription_model() -> String {
    "base".to_string()
}

fn default_transcription_language() -> String {
    "auto".to_string()
}

fn default_transcription_timeout_secs() -> u64 {
    1800
}

fn default_separation_model() -> String {
    "htdemucs".to_string()
}

fn default_separation_timeout_secs() -> u64 {
    1800
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate the forced language if one is set
        if let Some(language) = self.transcription.forced_language() {
            crate::language_utils::validate_language_code(language)
                .map_err(|e| anyhow!("Invalid transcription language: {}", e))?;
        }

        if self.transcription.model.trim().is_empty() {
            return Err(anyhow!("Transcription model must not be empty"));
        }

        if self.separation.model.trim().is_empty() {
            return Err(anyhow!("Separation model must not be empty"));
        }

        // Line policy limits must leave room for at least one word
        if self.line_policy.max_chars == 0 {
            return Err(anyhow!("line_policy.max_chars must be at least 1"));
        }
        if self.line_policy.max_words == 0 {
            return Err(anyhow!("line_policy.max_words must be at least 1"));
        }
        if self.line_policy.max_duration_secs <= 0.0 {
            return Err(anyhow!("line_policy.max_duration_secs must be positive"));
        }
        if self.line_policy.gap_threshold_secs <= 0.0 {
            return Err(anyhow!("line_policy.gap_threshold_secs must be positive"));
        }

        if self.ass_style.font_size == 0 {
            return Err(anyhow!("ass_style.font_size must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_folder: default_output_folder(),
            temp_folder: default_temp_folder(),
            keep_temp_files: false,
            subtitle_format: SubtitleFormat::default(),
            output_kind: OutputKind::default(),
            line_policy: LinePolicy::default(),
            ass_style: AssStyle::default(),
            transcription: TranscriptionConfig::default(),
            separation: SeparationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
