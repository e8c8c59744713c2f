/*!
 * Tests for the transcription engine boundary
 */

use std::path::Path;

use yakara::errors::TranscriptionError;
use yakara::transcription::mock::MockTranscriber;
use yakara::transcription::{Transcriber, whisper::WhisperCli};
use crate::common;

#[tokio::test]
async fn test_mock_withSegments_shouldReturnThemVerbatim() {
    let segments = vec![common::hello_world_segment()];
    let transcriber = MockTranscriber::with_segments(segments.clone());

    let transcription = transcriber.transcribe(Path::new("vocals.wav"), None).await.unwrap();

    assert_eq!(transcription.segments, segments);
    assert_eq!(transcriber.call_count(), 1);
}

#[tokio::test]
async fn test_mock_withForcedLanguage_shouldEchoIt() {
    let transcriber = MockTranscriber::with_segments(vec![common::hello_world_segment()]);

    let transcription = transcriber.transcribe(Path::new("vocals.wav"), Some("zh")).await.unwrap();

    assert_eq!(transcription.language.as_deref(), Some("zh"));
}

#[tokio::test]
async fn test_mock_failing_shouldReportProcessError() {
    let transcriber = MockTranscriber::failing();

    let result = transcriber.transcribe(Path::new("vocals.wav"), None).await;

    assert!(matches!(result, Err(TranscriptionError::ProcessFailed(_))));
    assert!(transcriber.check_available().await.is_err());
}

#[tokio::test]
async fn test_whisper_withMissingAudio_shouldFailBeforeLaunching() {
    let temp_dir = common::create_temp_dir().unwrap();
    let missing = temp_dir.path().join("missing.wav");

    let transcriber = WhisperCli::new("base", 5);
    let result = transcriber.transcribe(&missing, None).await;

    assert!(matches!(result, Err(TranscriptionError::ProcessFailed(_))));
}

#[test]
fn test_whisper_new_shouldKeepModelName() {
    let transcriber = WhisperCli::new("small", 60);
    assert_eq!(transcriber.model(), "small");
}
