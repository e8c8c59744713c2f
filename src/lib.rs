/*!
 * # yakara - Yet Another KARAoke generator
 *
 * A Rust library for turning a media source into a karaoke-ready stereo mix
 * with time-synchronized subtitles.
 *
 * ## Features
 *
 * - Download media with yt-dlp or stage local files
 * - Extract audio and separate vocals with demucs
 * - Build the classic KTV stereo layout (instrumental left, full mix right)
 * - Transcribe the vocal stem with word-level timestamps (Whisper)
 * - Repair imperfect engine timestamps into renderable karaoke timing
 * - Render ASS subtitles with per-word highlight sweep, SRT as fallback
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle`: The subtitle synchronization core:
 *   - `subtitle::normalizer`: Timestamp cleaning and repair
 *   - `subtitle::karaoke`: Word grouping into karaoke lines
 *   - `subtitle::ass`: ASS rendering with karaoke tags
 *   - `subtitle::srt`: SRT rendering and parsing
 *   - `subtitle::coordinator`: Format dispatch and file writing
 * - `transcription`: Speech-recognition engine boundary:
 *   - `transcription::whisper`: Whisper CLI engine
 *   - `transcription::mock`: Deterministic engine for tests
 * - `media`: Acquisition and audio processing:
 *   - `media::downloader`: yt-dlp downloads and local staging
 *   - `media::audio`: ffmpeg/demucs audio pipeline
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle;
pub mod transcription;
pub mod media;
pub mod app_controller;
pub mod language_utils;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use subtitle::{AssStyle, KaraokeLine, LinePolicy, SubtitleFormat};
pub use transcription::{Transcriber, Transcription, TranscriptionSegment, WordTiming};
pub use errors::{AppError, MediaError, SubtitleError, TranscriptionError};
