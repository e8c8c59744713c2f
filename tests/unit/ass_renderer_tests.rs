/*!
 * Tests for ASS rendering with karaoke tags
 */

use once_cell::sync::Lazy;
use regex::Regex;

use yakara::errors::SubtitleError;
use yakara::subtitle::ass::{AssStyle, format_ass_time, render, to_centiseconds};
use yakara::subtitle::karaoke::KaraokeLine;
use crate::common::make_line;

static KARAOKE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\k(\d+)").unwrap());

fn dialogue_lines(document: &str) -> Vec<&str> {
    document.lines().filter(|l| l.starts_with("Dialogue:")).collect()
}

/// Empty transcription still produces a syntactically valid document:
/// all three section headers, no events
#[test]
fn test_render_withNoLines_shouldProduceHeaderOnlyDocument() {
    let document = render(&[], &AssStyle::default()).unwrap();

    assert!(document.contains("[Script Info]"));
    assert!(document.contains("[V4+ Styles]"));
    assert!(document.contains("[Events]"));
    assert!(document.contains("ScriptType: v4.00+"));
    assert!(dialogue_lines(&document).is_empty());
}

#[test]
fn test_render_withHelloWorldLine_shouldEmitExpectedKaraokeTags() {
    let line = make_line(&[("hello", 1.0, 1.5), ("world", 1.6, 2.9)]);

    let document = render(&[line], &AssStyle::default()).unwrap();

    let dialogues = dialogue_lines(&document);
    assert_eq!(dialogues.len(), 1);

    // Word tags are 50cs and 130cs; the 0.1s silence between the words
    // becomes an empty 10cs gap tag so the line sums to 190cs
    assert!(dialogues[0].contains(r"{\k50}hello {\k10}{\k130}world"));
    assert!(dialogues[0].contains("0:00:01.00"));
    assert!(dialogues[0].contains("0:00:02.90"));
}

/// Tag durations in every line must sum exactly to the line duration in
/// centiseconds, with the last word absorbing truncation error
#[test]
fn test_render_withUnevenTimings_tagsSumToLineDuration() {
    let line = make_line(&[("a", 0.33, 0.77), ("bb", 0.91, 1.239), ("ccc", 1.4, 2.001)]);
    let expected_cs = to_centiseconds(line.end) - to_centiseconds(line.start);

    let style = AssStyle { next_line_preview: false, ..AssStyle::default() };
    let document = render(&[line], &style).unwrap();

    let dialogue = dialogue_lines(&document)[0];
    let tag_sum: i64 = KARAOKE_TAG_REGEX
        .captures_iter(dialogue)
        .map(|caps| caps[1].parse::<i64>().unwrap())
        .sum();

    assert_eq!(tag_sum, expected_cs);
}

#[test]
fn test_render_withTimestamps_shouldTruncateNotRound() {
    // 1.239s truncates to 1.23, never rounds to 1.24
    assert_eq!(format_ass_time(1.239), "0:00:01.23");
    assert_eq!(format_ass_time(2.9), "0:00:02.90");
    assert_eq!(format_ass_time(0.0), "0:00:00.00");
    assert_eq!(format_ass_time(3725.019), "1:02:05.01");
}

/// A line with zero words reaching the renderer is an internal defect
#[test]
fn test_render_withEmptyLine_shouldFailLoudly() {
    let line = KaraokeLine { start: 1.0, end: 2.0, words: Vec::new() };

    let result = render(&[line], &AssStyle::default());

    assert!(matches!(result, Err(SubtitleError::EmptyLine { .. })));
}

#[test]
fn test_render_withInvalidTimeRange_shouldFailLoudly() {
    let mut line = make_line(&[("word", 2.0, 2.5)]);
    line.end = line.start;

    let result = render(&[line], &AssStyle::default());

    assert!(matches!(result, Err(SubtitleError::InvalidTimeRange { .. })));
}

/// Re-rendering the same input with the same style is byte-identical
#[test]
fn test_render_withSameInput_shouldBeByteIdentical() {
    let lines = vec![
        make_line(&[("one", 0.0, 0.8), ("two", 1.0, 1.6)]),
        make_line(&[("three", 3.0, 3.9)]),
    ];
    let style = AssStyle::default();

    let first = render(&lines, &style).unwrap();
    let second = render(&lines, &style).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_render_withPreviewDisabled_shouldEmitOneEventPerLine() {
    let lines = vec![
        make_line(&[("first", 0.0, 1.0)]),
        make_line(&[("second", 2.0, 3.0)]),
    ];

    let style = AssStyle { next_line_preview: false, ..AssStyle::default() };
    let document = render(&lines, &style).unwrap();

    assert_eq!(dialogue_lines(&document).len(), 2);
}

/// With the preview enabled the upcoming line is shown unhighlighted
/// while the current one is sung
#[test]
fn test_render_withPreviewEnabled_shouldEmitPreviewEvents() {
    let lines = vec![
        make_line(&[("first", 0.0, 1.0)]),
        make_line(&[("second", 2.0, 3.0)]),
    ];

    let document = render(&lines, &AssStyle::default()).unwrap();

    let dialogues = dialogue_lines(&document);
    // Two karaoke events plus one preview for the second line
    assert_eq!(dialogues.len(), 3);

    let preview = dialogues[2];
    assert!(preview.ends_with(",second"));
    assert!(!preview.contains(r"\k"));
    // The preview runs from the first line's start to the second line's start
    assert!(preview.contains("0:00:00.00"));
    assert!(preview.contains("0:00:02.00"));
}

#[test]
fn test_render_withAlternatingLines_shouldAlternateStyles() {
    let lines = vec![
        make_line(&[("one", 0.0, 1.0)]),
        make_line(&[("two", 2.0, 3.0)]),
        make_line(&[("three", 4.0, 5.0)]),
    ];

    let style = AssStyle { next_line_preview: false, ..AssStyle::default() };
    let document = render(&lines, &style).unwrap();

    let dialogues = dialogue_lines(&document);
    assert!(dialogues[0].contains(",Left,"));
    assert!(dialogues[1].contains(",Right,"));
    assert!(dialogues[2].contains(",Left,"));
}

#[test]
fn test_render_withCustomStyle_shouldCarryStyleParameters() {
    let style = AssStyle {
        font_name: "Noto Sans".to_string(),
        font_size: 64,
        play_res_x: 1920,
        play_res_y: 1080,
        ..AssStyle::default()
    };

    let document = render(&[], &style).unwrap();

    assert!(document.contains("PlayResX: 1920"));
    assert!(document.contains("PlayResY: 1080"));
    assert!(document.contains("Noto Sans,64,"));
}
