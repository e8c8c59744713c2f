use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::subtitle::normalizer::NormalizedSegment;

// @module: Grouping normalized words into renderable karaoke lines

/// Limits governing how words are grouped into displayable lines
///
/// Defaults follow common subtitle readability convention (~42 visible
/// characters); they are supplied by configuration, never hardcoded in the
/// renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePolicy {
    /// Maximum characters per line, spaces included
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Maximum words per line
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Maximum duration of one line in seconds
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: f64,

    /// A silence gap at least this long starts a new line
    #[serde(default = "default_gap_threshold_secs")]
    pub gap_threshold_secs: f64,
}

impl Default for LinePolicy {
    fn default() -> Self {
        LinePolicy {
            max_chars: default_max_chars(),
            max_words: default_max_words(),
            max_duration_secs: default_max_duration_secs(),
            gap_threshold_secs: default_gap_threshold_secs(),
        }
    }
}

fn default_max_chars() -> usize {
    42
}

fn default_max_words() -> usize {
    10
}

fn default_max_duration_secs() -> f64 {
    10.0
}

fn default_gap_threshold_secs() -> f64 {
    1.0
}

// @struct: One word inside a karaoke line
#[derive(Debug, Clone, PartialEq)]
pub struct LineWord {
    // @field: Word text
    pub text: String,

    // @field: Start in seconds
    pub start: f64,

    // @field: End in seconds
    pub end: f64,
}

// @struct: A renderable subtitle line
#[derive(Debug, Clone, PartialEq)]
pub struct KaraokeLine {
    // @field: First word's start
    pub start: f64,

    // @field: Last word's end
    pub end: f64,

    // @field: Words in chronological order
    pub words: Vec<LineWord>,
}

impl KaraokeLine {
    /// Plain display text of the line
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Visible character count, separating spaces included
    pub fn char_count(&self) -> usize {
        let word_chars: usize = self.words.iter().map(|w| w.text.chars().count()).sum();
        word_chars + self.words.len().saturating_sub(1)
    }

    /// Line duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.end - self.start
    }
}

/// Greedily accumulate normalized words into karaoke lines.
///
/// A line closes when appending the next word would exceed a policy limit
/// (characters, words, or duration), when the silence gap before that word
/// reaches the threshold, or at a segment boundary (a segment is a phrase as
/// heard by the engine). A single word longer than the character limit still
/// becomes its own line; words are never split. Segments with no words
/// produce no lines.
pub fn build_lines(segments: &[NormalizedSegment], policy: &LinePolicy) -> Vec<KaraokeLine> {
    let total_words: usize = segments.iter().map(|s| s.words.len()).sum();

    let mut lines = Vec::new();

    for segment in segments {
        if segment.words.is_empty() {
            continue;
        }

        let mut current: Vec<LineWord> = Vec::new();
        let mut current_chars = 0usize;

        for word in &segment.words {
            let word_chars = word.text.chars().count();

            if !current.is_empty() {
                let gap = word.start - current.last().map(|w| w.end).unwrap_or(0.0);
                let chars_if_added = current_chars + 1 + word_chars;
                let duration_if_added = word.end - current[0].start;

                let must_close = gap >= policy.gap_threshold_secs
                    || current.len() + 1 > policy.max_words
                    || chars_if_added > policy.max_chars
                    || duration_if_added > policy.max_duration_secs;

                if must_close {
                    lines.push(close_line(std::mem::take(&mut current)));
                    current_chars = 0;
                }
            }

            current_chars += if current.is_empty() { word_chars } else { 1 + word_chars };
            current.push(LineWord {
                text: word.text.clone(),
                start: word.start,
                end: word.end,
            });
        }

        if !current.is_empty() {
            lines.push(close_line(current));
        }
    }

    // Every word must land in exactly one line
    let grouped_words: usize = lines.iter().map(|l| l.words.len()).sum();
    if grouped_words != total_words {
        error!(
            "CRITICAL ERROR: Lost words during line grouping! Input: {}, grouped: {}",
            total_words, grouped_words
        );
    } else {
        debug!("Grouped {} words into {} lines", total_words, lines.len());
    }

    lines
}

fn close_line(words: Vec<LineWord>) -> KaraokeLine {
    let start = words.first().map(|w| w.start).unwrap_or(0.0);
    let end = words.last().map(|w| w.end).unwrap_or(start);
    KaraokeLine { start, end, words }
}
