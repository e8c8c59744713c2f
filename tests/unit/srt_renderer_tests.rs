/*!
 * Tests for SRT rendering and parsing
 */

use yakara::errors::SubtitleError;
use yakara::subtitle::karaoke::KaraokeLine;
use yakara::subtitle::srt::{SrtEntry, parse_srt_string, render, to_milliseconds};
use crate::common::make_line;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SrtEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SrtEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

#[test]
fn test_timestamp_parsing_withInvalidComponents_shouldFail() {
    assert!(SrtEntry::parse_timestamp("00:61:00,000").is_err());
    assert!(SrtEntry::parse_timestamp("00:00:00").is_err());
    assert!(SrtEntry::parse_timestamp("garbage").is_err());
}

/// Empty line sequence produces an empty but well-formed document
#[test]
fn test_render_withNoLines_shouldProduceEmptyDocument() {
    let document = render(&[]).unwrap();
    assert!(document.is_empty());
}

#[test]
fn test_render_withLines_shouldNumberBlocksSequentially() {
    let lines = vec![
        make_line(&[("hello", 1.0, 1.5), ("world", 1.6, 2.9)]),
        make_line(&[("next", 4.0, 4.8), ("phrase", 4.9, 5.5)]),
    ];

    let document = render(&lines).unwrap();

    let expected = "1\n00:00:01,000 --> 00:00:02,900\nhello world\n\n\
                    2\n00:00:04,000 --> 00:00:05,500\nnext phrase\n\n";
    assert_eq!(document, expected);
}

/// Word-level timing is not representable in SRT; the text is plain
#[test]
fn test_render_withKaraokeLine_shouldOmitWordTiming() {
    let lines = vec![make_line(&[("no", 0.0, 0.4), ("tags", 0.5, 1.0)])];

    let document = render(&lines).unwrap();

    assert!(!document.contains('{'));
    assert!(!document.contains('\\'));
}

#[test]
fn test_render_withEmptyLine_shouldFailLoudly() {
    let line = KaraokeLine { start: 0.0, end: 1.0, words: Vec::new() };

    let result = render(&[line]);

    assert!(matches!(result, Err(SubtitleError::EmptyLine { .. })));
}

#[test]
fn test_to_milliseconds_shouldTruncateNotRound() {
    assert_eq!(to_milliseconds(1.2399), 1239);
    assert_eq!(to_milliseconds(2.9), 2900);
    assert_eq!(to_milliseconds(0.0005), 0);
}

/// Re-parsing a rendered document yields the same (start, end, text)
/// triples modulo millisecond truncation
#[test]
fn test_roundtrip_withRenderedDocument_shouldReparseSameTriples() {
    let lines = vec![
        make_line(&[("one", 0.25, 0.7), ("two", 0.81, 1.33)]),
        make_line(&[("three", 2.0, 2.66)]),
        make_line(&[("four", 4.019, 5.5), ("five", 5.6, 6.001)]),
    ];

    let document = render(&lines).unwrap();
    let entries = parse_srt_string(&document).unwrap();

    assert_eq!(entries.len(), lines.len());
    for (entry, line) in entries.iter().zip(&lines) {
        assert_eq!(entry.start_time_ms, to_milliseconds(line.start));
        assert_eq!(entry.end_time_ms, to_milliseconds(line.end));
        assert_eq!(entry.text, line.text());
    }
}

/// Test parsing SRT string content
#[test]
fn test_parse_srt_string_withValidContent_shouldParseCorrectly() {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:08,000\nTest subtitle\nSecond line\n\n";

    let entries = parse_srt_string(srt_content).unwrap();

    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[0].start_time_ms, 1000);
    assert_eq!(entries[0].end_time_ms, 4000);
    assert_eq!(entries[0].text, "Hello world");

    assert_eq!(entries[1].seq_num, 2);
    assert_eq!(entries[1].start_time_ms, 5000);
    assert_eq!(entries[1].end_time_ms, 8000);
    assert_eq!(entries[1].text, "Test subtitle\nSecond line");
}

#[test]
fn test_parse_srt_string_withEmptyContent_shouldYieldNoEntries() {
    let entries = parse_srt_string("").unwrap();
    assert!(entries.is_empty());
}

#[test]
fn test_parse_srt_string_withOutOfOrderBlocks_shouldSortAndRenumber() {
    let srt_content = "2\n00:00:05,000 --> 00:00:06,000\nlater\n\n1\n00:00:01,000 --> 00:00:02,000\nearlier\n\n";

    let entries = parse_srt_string(srt_content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[0].text, "earlier");
    assert_eq!(entries[1].seq_num, 2);
    assert_eq!(entries[1].text, "later");
}

#[test]
fn test_parse_srt_string_withInvalidTimeRange_shouldSkipEntry() {
    let srt_content = "1\n00:00:05,000 --> 00:00:05,000\nzero duration\n\n2\n00:00:06,000 --> 00:00:07,000\nvalid\n\n";

    let entries = parse_srt_string(srt_content).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "valid");
}
