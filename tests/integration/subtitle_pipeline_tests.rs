/*!
 * End-to-end tests for the subtitle half of the pipeline, driven by the
 * mock transcription engine so no external binaries are needed
 */

use std::path::Path;

use yakara::app_config::Config;
use yakara::app_controller::Controller;
use yakara::subtitle::coordinator::SubtitleFormat;
use yakara::subtitle::srt::parse_srt_string;
use yakara::transcription::mock::MockTranscriber;
use yakara::transcription::{TranscriptionSegment, WordTiming};
use crate::common;

fn controller_with_format(format: SubtitleFormat) -> Controller {
    let config = Config { subtitle_format: format, ..Config::default() };
    Controller::with_config(config).unwrap()
}

#[tokio::test]
async fn test_pipeline_withWordTimings_shouldWriteBothDocuments() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output_base = temp_dir.path().join("song_ktv");

    let transcriber = MockTranscriber::with_segments(vec![common::hello_world_segment()]);
    let controller = controller_with_format(SubtitleFormat::Both);

    let written = controller
        .generate_subtitle_files(&transcriber, Path::new("vocals.wav"), 180.0, &output_base)
        .await
        .unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(transcriber.call_count(), 1);

    let ass_content = std::fs::read_to_string(temp_dir.path().join("song_ktv.ass")).unwrap();
    assert!(ass_content.contains(r"{\k50}hello {\k10}{\k130}world"));

    let srt_content = std::fs::read_to_string(temp_dir.path().join("song_ktv.srt")).unwrap();
    let entries = parse_srt_string(&srt_content).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "hello world");
    assert_eq!(entries[0].start_time_ms, 1000);
    assert_eq!(entries[0].end_time_ms, 2900);
}

/// An instrumental track (no detected lyrics) still produces valid,
/// empty-body documents
#[tokio::test]
async fn test_pipeline_withEmptyTranscription_shouldWriteValidEmptyDocuments() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output_base = temp_dir.path().join("instrumental_ktv");

    let transcriber = MockTranscriber::empty();
    let controller = controller_with_format(SubtitleFormat::Both);

    let written = controller
        .generate_subtitle_files(&transcriber, Path::new("vocals.wav"), 120.0, &output_base)
        .await
        .unwrap();

    assert_eq!(written.len(), 2);

    let ass_content = std::fs::read_to_string(&written[0]).unwrap();
    assert!(ass_content.contains("[Script Info]"));
    assert!(!ass_content.contains("Dialogue:"));

    let srt_content = std::fs::read_to_string(&written[1]).unwrap();
    assert!(srt_content.is_empty());
}

#[tokio::test]
async fn test_pipeline_withFailingEngine_shouldSurfaceError() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output_base = temp_dir.path().join("song_ktv");

    let transcriber = MockTranscriber::failing();
    let controller = controller_with_format(SubtitleFormat::Ass);

    let result = controller
        .generate_subtitle_files(&transcriber, Path::new("vocals.wav"), 60.0, &output_base)
        .await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join("song_ktv.ass").exists());
}

/// The 2 second silence between phrases forces a line break all the way
/// through to the rendered document
#[tokio::test]
async fn test_pipeline_withSilenceGap_shouldSplitLines() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output_base = temp_dir.path().join("song_ktv");

    let segments = vec![TranscriptionSegment::new(
        0.0,
        6.0,
        "first phrase second phrase",
        vec![
            WordTiming::new("first", 0.0, 0.5),
            WordTiming::new("phrase", 0.6, 1.0),
            WordTiming::new("second", 3.0, 3.5),
            WordTiming::new("phrase", 3.6, 4.0),
        ],
    )];

    let transcriber = MockTranscriber::with_segments(segments);
    let controller = controller_with_format(SubtitleFormat::Srt);

    controller
        .generate_subtitle_files(&transcriber, Path::new("vocals.wav"), 60.0, &output_base)
        .await
        .unwrap();

    let srt_content = std::fs::read_to_string(temp_dir.path().join("song_ktv.srt")).unwrap();
    let entries = parse_srt_string(&srt_content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "first phrase");
    assert_eq!(entries[1].text, "second phrase");
}

/// Segment-only granularity from the engine still renders per-word
/// karaoke tags through the interpolation fallback
#[tokio::test]
async fn test_pipeline_withSegmentOnlyGranularity_shouldStillRenderKaraokeTags() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output_base = temp_dir.path().join("song_ktv");

    let segments = vec![TranscriptionSegment::new(2.0, 6.0, "sung without word timings", vec![])];

    let transcriber = MockTranscriber::with_segments(segments);
    let controller = controller_with_format(SubtitleFormat::Ass);

    controller
        .generate_subtitle_files(&transcriber, Path::new("vocals.wav"), 60.0, &output_base)
        .await
        .unwrap();

    let ass_content = std::fs::read_to_string(temp_dir.path().join("song_ktv.ass")).unwrap();
    let dialogue = ass_content
        .lines()
        .find(|l| l.starts_with("Dialogue:"))
        .expect("expected a dialogue event");

    assert_eq!(dialogue.matches(r"\k").count(), 4);
    assert!(dialogue.contains("0:00:02.00"));
    assert!(dialogue.contains("0:00:06.00"));
}

#[tokio::test]
async fn test_pipeline_runTwice_shouldProduceIdenticalDocuments() {
    let temp_dir = common::create_temp_dir().unwrap();
    let base_one = temp_dir.path().join("one_ktv");
    let base_two = temp_dir.path().join("two_ktv");

    let transcriber = MockTranscriber::with_segments(vec![common::hello_world_segment()]);
    let controller = controller_with_format(SubtitleFormat::Ass);

    controller
        .generate_subtitle_files(&transcriber, Path::new("vocals.wav"), 180.0, &base_one)
        .await
        .unwrap();
    controller
        .generate_subtitle_files(&transcriber, Path::new("vocals.wav"), 180.0, &base_two)
        .await
        .unwrap();

    let first = std::fs::read_to_string(temp_dir.path().join("one_ktv.ass")).unwrap();
    let second = std::fs::read_to_string(temp_dir.path().join("two_ktv.ass")).unwrap();
    assert_eq!(first, second);
}
