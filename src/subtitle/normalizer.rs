use log::{debug, warn};

use crate::transcription::TranscriptionSegment;

// @module: Timestamp normalization for raw engine output

/// Minimum duration a word keeps after clamping, so it stays renderable
pub const MIN_WORD_DURATION_SECS: f64 = 0.05;

/// Where a word's timing came from
///
/// The engine sometimes degrades to segment-only granularity; words then get
/// synthetic timings. The distinction never reaches the output formats but
/// matters for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingOrigin {
    /// Timing reported by the engine itself
    Reported,
    /// Timing synthesized by interpolation over the segment span
    Interpolated,
}

// @struct: A word with repaired timing
#[derive(Debug, Clone, PartialEq)]
pub struct TimedWord {
    // @field: Trimmed, non-empty word text
    pub text: String,

    // @field: Start in seconds
    pub start: f64,

    // @field: End in seconds
    pub end: f64,

    // @field: Timing provenance
    pub origin: TimingOrigin,
}

// @struct: A segment whose words satisfy the timing invariants
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSegment {
    // @field: Segment start in seconds
    pub start: f64,

    // @field: Segment end in seconds
    pub end: f64,

    // @field: Full segment text
    pub text: String,

    // @field: Words in chronological order, non-overlapping
    pub words: Vec<TimedWord>,
}

/// Clean and repair the engine's raw segment sequence.
///
/// Guarantees on the output:
/// - segments keep emission order, with starts clamped to the previous
///   segment's end
/// - every word has trimmed non-empty text, `start >= 0`,
///   `end <= media_duration_secs`, and at least the floor duration where the
///   media tail allows it
/// - adjacent words within a segment never overlap
/// - segments with no usable words but non-empty text get interpolated
///   per-word timings weighted by character length
///
/// An empty input yields an empty output; a song with no detected lyrics is
/// a legitimate outcome, not an error. A non-positive `media_duration_secs`
/// disables the upper clamp.
pub fn normalize(
    segments: &[TranscriptionSegment],
    media_duration_secs: f64,
) -> Vec<NormalizedSegment> {
    if segments.is_empty() {
        debug!("Engine returned no segments, yielding empty normalization");
        return Vec::new();
    }

    let limit = if media_duration_secs > 0.0 {
        media_duration_secs
    } else {
        f64::MAX
    };

    let mut result = Vec::with_capacity(segments.len());
    let mut prev_segment_end = 0.0_f64;

    for raw in segments {
        let seg_start = sanitize(raw.start).max(0.0).max(prev_segment_end);
        if seg_start >= limit {
            warn!(
                "Dropping segment starting at {:.2}s, past media duration {:.2}s",
                raw.start, limit
            );
            continue;
        }

        let mut seg_end = sanitize(raw.end).min(limit);
        if seg_end <= seg_start {
            seg_end = (seg_start + MIN_WORD_DURATION_SECS).min(limit);
        }

        let words = normalize_words(raw, seg_start, seg_end, limit);

        prev_segment_end = seg_end;
        result.push(NormalizedSegment {
            start: seg_start,
            end: seg_end,
            text: raw.text.trim().to_string(),
            words,
        });
    }

    result
}

fn normalize_words(
    raw: &TranscriptionSegment,
    seg_start: f64,
    seg_end: f64,
    limit: f64,
) -> Vec<TimedWord> {
    // Drop whitespace-only words without touching their neighbors' timing
    let mut reported: Vec<TimedWord> = raw
        .words
        .iter()
        .filter(|w| !w.text.trim().is_empty())
        .map(|w| TimedWord {
            text: w.text.trim().to_string(),
            start: sanitize(w.start),
            end: sanitize(w.end),
            origin: TimingOrigin::Reported,
        })
        .collect();

    if reported.is_empty() {
        return interpolate_words(&raw.text, seg_start, seg_end);
    }

    // Engines occasionally report words out of chronological order; repair
    // with a stable sort so ties keep emission order.
    if reported.windows(2).any(|pair| pair[0].start > pair[1].start) {
        debug!(
            "Segment at {:.2}s has out-of-order words, re-sorting by start time",
            seg_start
        );
        reported.sort_by(|a, b| {
            a.start
                .partial_cmp(&b.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    // Engines occasionally emit the same word twice at the same position
    reported.dedup_by(|a, b| a.text == b.text && a.start == b.start && a.end == b.end);

    let mut repaired = Vec::with_capacity(reported.len());
    let mut prev_end = 0.0_f64;

    for mut word in reported {
        word.start = word.start.max(0.0).max(prev_end);
        if word.start >= limit {
            warn!("Dropping word {:?}, past media duration {:.2}s", word.text, limit);
            continue;
        }

        word.end = word.end.max(word.start);
        if word.end - word.start < MIN_WORD_DURATION_SECS {
            word.end = word.start + MIN_WORD_DURATION_SECS;
        }
        if word.end > limit {
            // The media tail may leave less than the floor duration
            word.end = limit;
            word.start = word.start.min(word.end);
        }

        prev_end = word.end;
        repaired.push(word);
    }

    repaired
}

/// Assign synthetic per-word timings across `[start, end]`, proportional to
/// each word's character count. The cumulative allocation makes the word
/// durations sum to exactly the segment duration, with the last word pinned
/// to the segment end.
fn interpolate_words(text: &str, start: f64, end: f64) -> Vec<TimedWord> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let span = end - start;
    let total_weight: usize = tokens.iter().map(|t| t.chars().count()).sum();
    let total_weight = total_weight.max(1) as f64;

    let mut words = Vec::with_capacity(tokens.len());
    let mut consumed = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let word_start = start + span * (consumed as f64 / total_weight);
        consumed += token.chars().count();
        let word_end = if i == tokens.len() - 1 {
            end
        } else {
            start + span * (consumed as f64 / total_weight)
        };

        words.push(TimedWord {
            text: token.to_string(),
            start: word_start,
            end: word_end,
            origin: TimingOrigin::Interpolated,
        });
    }

    words
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
