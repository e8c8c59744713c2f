/*!
 * Tests for timestamp normalization
 */

use yakara::subtitle::normalizer::{MIN_WORD_DURATION_SECS, TimingOrigin, normalize};
use yakara::transcription::{TranscriptionSegment, WordTiming};
use crate::common;

/// No segments from the engine is a legitimate outcome, not an error
#[test]
fn test_normalize_withEmptyInput_shouldYieldEmpty() {
    let normalized = normalize(&[], 180.0);
    assert!(normalized.is_empty());
}

#[test]
fn test_normalize_withCleanWords_shouldPreserveTimings() {
    let segments = vec![common::hello_world_segment()];

    let normalized = normalize(&segments, 10.0);

    assert_eq!(normalized.len(), 1);
    let words = &normalized[0].words;
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].text, "hello");
    assert_eq!(words[0].start, 1.0);
    assert_eq!(words[0].end, 1.5);
    assert_eq!(words[0].origin, TimingOrigin::Reported);
    assert_eq!(words[1].text, "world");
    assert_eq!(words[1].start, 1.6);
    assert_eq!(words[1].end, 2.9);
}

/// The no-overlap invariant must hold for every adjacent word pair
#[test]
fn test_normalize_withOverlappingWords_shouldRemoveOverlap() {
    let segments = vec![TranscriptionSegment::new(
        0.0,
        5.0,
        "one two three",
        vec![
            WordTiming::new("one", 0.0, 1.2),
            WordTiming::new("two", 1.0, 2.5),
            WordTiming::new("three", 2.4, 3.0),
        ],
    )];

    let normalized = normalize(&segments, 10.0);

    let words = &normalized[0].words;
    assert_eq!(words.len(), 3);
    for pair in words.windows(2) {
        assert!(
            pair[0].end <= pair[1].start,
            "words {:?} and {:?} overlap",
            pair[0].text,
            pair[1].text
        );
    }
}

#[test]
fn test_normalize_withMissingWordTimings_shouldInterpolateByCharLength() {
    // Weights 2, 4, 2 over a 4 second span
    let segments = vec![TranscriptionSegment::new(10.0, 14.0, "ab cdef gh", vec![])];

    let normalized = normalize(&segments, 20.0);

    let words = &normalized[0].words;
    assert_eq!(words.len(), 3);
    assert!(words.iter().all(|w| w.origin == TimingOrigin::Interpolated));

    assert!((words[0].start - 10.0).abs() < 1e-9);
    assert!((words[0].end - 11.0).abs() < 1e-9);
    assert!((words[1].start - 11.0).abs() < 1e-9);
    assert!((words[1].end - 13.0).abs() < 1e-9);
    assert!((words[2].start - 13.0).abs() < 1e-9);
    assert_eq!(words[2].end, 14.0);
}

/// Interpolated timings must sum to exactly the segment duration
#[test]
fn test_normalize_withInterpolation_durationsSumToSegmentSpan() {
    let segments = vec![TranscriptionSegment::new(
        3.7,
        9.13,
        "some uneven words of differing length",
        vec![],
    )];

    let normalized = normalize(&segments, 60.0);

    let words = &normalized[0].words;
    assert_eq!(words.len(), 6);
    let total: f64 = words.iter().map(|w| w.end - w.start).sum();
    assert!((total - (9.13 - 3.7)).abs() < 1e-9);
    assert_eq!(words.last().unwrap().end, 9.13);
}

#[test]
fn test_normalize_withNegativeStart_shouldClampToZero() {
    let segments = vec![TranscriptionSegment::new(
        -0.4,
        2.0,
        "late start",
        vec![WordTiming::new("late", -0.4, 0.5), WordTiming::new("start", 0.6, 1.9)],
    )];

    let normalized = normalize(&segments, 10.0);

    assert_eq!(normalized[0].start, 0.0);
    assert!(normalized[0].words[0].start >= 0.0);
}

/// A segment starting before its predecessor ends is clamped forward
#[test]
fn test_normalize_withOverlappingSegments_shouldClampNextSegmentStart() {
    let segments = vec![
        TranscriptionSegment::new(0.0, 5.0, "first", vec![WordTiming::new("first", 0.0, 5.0)]),
        TranscriptionSegment::new(4.0, 8.0, "second", vec![WordTiming::new("second", 4.0, 8.0)]),
    ];

    let normalized = normalize(&segments, 20.0);

    assert_eq!(normalized.len(), 2);
    assert_eq!(normalized[1].start, 5.0);
    assert!(normalized[1].start >= normalized[0].end);
}

#[test]
fn test_normalize_withZeroDurationWord_shouldApplyFloorDuration() {
    let segments = vec![TranscriptionSegment::new(
        0.0,
        5.0,
        "a b",
        vec![WordTiming::new("a", 2.0, 2.0), WordTiming::new("b", 2.0, 1.5)],
    )];

    let normalized = normalize(&segments, 10.0);

    for word in &normalized[0].words {
        assert!(
            word.end - word.start >= MIN_WORD_DURATION_SECS - 1e-9,
            "word {:?} is shorter than the floor",
            word.text
        );
    }
}

/// Dropping whitespace-only words must not shift their neighbors
#[test]
fn test_normalize_withWhitespaceWords_shouldDropWithoutShiftingNeighbors() {
    let segments = vec![TranscriptionSegment::new(
        0.0,
        3.0,
        "a b",
        vec![
            WordTiming::new("a", 1.0, 1.5),
            WordTiming::new("   ", 1.5, 1.6),
            WordTiming::new("b", 1.7, 2.0),
        ],
    )];

    let normalized = normalize(&segments, 10.0);

    let words = &normalized[0].words;
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].text, "a");
    assert_eq!(words[0].start, 1.0);
    assert_eq!(words[0].end, 1.5);
    assert_eq!(words[1].text, "b");
    assert_eq!(words[1].start, 1.7);
    assert_eq!(words[1].end, 2.0);
}

#[test]
fn test_normalize_withDuplicateWords_shouldDropRepeats() {
    let segments = vec![TranscriptionSegment::new(
        0.0,
        3.0,
        "echo echo once",
        vec![
            WordTiming::new("echo", 0.5, 1.0),
            WordTiming::new("echo", 0.5, 1.0),
            WordTiming::new("once", 1.5, 2.0),
        ],
    )];

    let normalized = normalize(&segments, 10.0);

    let texts: Vec<&str> = normalized[0].words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["echo", "once"]);
}

/// Out-of-order words are undefined engine input; the documented repair is
/// a stable sort by start time
#[test]
fn test_normalize_withOutOfOrderWords_shouldSortByStartTime() {
    let segments = vec![TranscriptionSegment::new(
        0.0,
        5.0,
        "first second third",
        vec![
            WordTiming::new("third", 3.0, 4.0),
            WordTiming::new("first", 0.5, 1.0),
            WordTiming::new("second", 1.5, 2.5),
        ],
    )];

    let normalized = normalize(&segments, 10.0);

    let texts: Vec<&str> = normalized[0].words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[test]
fn test_normalize_withWordsPastMediaDuration_shouldClampToDuration() {
    let segments = vec![TranscriptionSegment::new(
        7.0,
        12.0,
        "tail words",
        vec![WordTiming::new("tail", 7.0, 8.0), WordTiming::new("words", 8.5, 11.0)],
    )];

    let normalized = normalize(&segments, 9.0);

    assert!(normalized[0].end <= 9.0);
    for word in &normalized[0].words {
        assert!(word.end <= 9.0, "word {:?} ends past the media duration", word.text);
    }
}

#[test]
fn test_normalize_withWhitespaceOnlySegmentText_shouldKeepSegmentWithoutWords() {
    let segments = vec![TranscriptionSegment::new(0.0, 2.0, "   ", vec![])];

    let normalized = normalize(&segments, 10.0);

    assert_eq!(normalized.len(), 1);
    assert!(normalized[0].words.is_empty());
}
