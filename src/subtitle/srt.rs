use std::fmt;
use anyhow::{Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::subtitle::karaoke::KaraokeLine;

// @module: SubRip rendering and parsing

// Guards against binary representation error when truncating to milliseconds
const TRUNCATION_EPSILON: f64 = 1e-6;

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @struct: Single SRT block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrtEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Block text
    pub text: String,
}

impl SrtEntry {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SrtEntry { seq_num, start_time_ms, end_time_ms, text }
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Parse an SRT timestamp to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        // Parse HH:MM:SS,mmm format
        let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse()?;
        let minutes: u64 = parts[1].parse()?;
        let seconds: u64 = parts[2].parse()?;
        let millis: u64 = parts[3].parse()?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }
}

impl fmt::Display for SrtEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Render the SRT document for the given lines.
///
/// Word-level highlighting is not representable in SRT and is intentionally
/// omitted; each line becomes one plain-text block. Indices are 1-based and
/// contiguous; timestamps truncate to milliseconds. An empty line sequence
/// produces an empty document.
pub fn render(lines: &[KaraokeLine]) -> Result<String, SubtitleError> {
    let mut output = String::with_capacity(lines.len() * 64);

    for (idx, line) in lines.iter().enumerate() {
        if line.words.is_empty() {
            return Err(SubtitleError::EmptyLine { start_secs: line.start });
        }
        if line.end <= line.start {
            return Err(SubtitleError::InvalidTimeRange {
                start_secs: line.start,
                end_secs: line.end,
            });
        }

        let entry = SrtEntry::new(
            idx + 1,
            to_milliseconds(line.start),
            to_milliseconds(line.end),
            line.text(),
        );
        output.push_str(&entry.to_string());
    }

    Ok(output)
}

/// Truncate seconds to milliseconds (never round)
pub fn to_milliseconds(secs: f64) -> u64 {
    (secs.max(0.0) * 1000.0 + TRUNCATION_EPSILON).floor() as u64
}

/// Parse SRT format string into entries.
///
/// Used to re-read documents this module produced; tolerant of the usual
/// malformations (stray text, bad timestamps) the same way a standard SRT
/// reader is. An empty document parses to an empty entry list.
pub fn parse_srt_string(content: &str) -> Result<Vec<SrtEntry>> {
    let mut entries = Vec::new();

    // State variables for parsing
    let mut current_seq_num: Option<usize> = None;
    let mut current_start_time_ms: Option<u64> = None;
    let mut current_end_time_ms: Option<u64> = None;
    let mut current_text = String::new();
    let mut line_count = 0;

    let mut finalize = |seq_num: usize, start_ms: u64, end_ms: u64, text: &str| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            warn!("Skipping empty subtitle entry {}", seq_num);
            return;
        }
        if end_ms <= start_ms {
            warn!(
                "Skipping subtitle entry {} with invalid time range: {} --> {}",
                seq_num, start_ms, end_ms
            );
            return;
        }
        entries.push(SrtEntry::new(seq_num, start_ms, end_ms, trimmed.to_string()));
    };

    for line in content.lines() {
        line_count += 1;
        let trimmed = line.trim();

        // An empty line finalizes the entry in progress
        if trimmed.is_empty() {
            if let (Some(seq_num), Some(start_ms), Some(end_ms)) =
                (current_seq_num, current_start_time_ms, current_end_time_ms)
            {
                finalize(seq_num, start_ms, end_ms, &current_text);
                current_seq_num = None;
                current_start_time_ms = None;
                current_end_time_ms = None;
                current_text.clear();
            }
            continue;
        }

        // Sequence number opens a new entry
        if current_seq_num.is_none() && current_text.is_empty() {
            if let Ok(num) = trimmed.parse::<usize>() {
                current_seq_num = Some(num);
                continue;
            }
        }

        // Timestamp row follows the sequence number
        if current_seq_num.is_some() && current_start_time_ms.is_none() {
            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                match (parse_timestamp_to_ms(&caps, 1), parse_timestamp_to_ms(&caps, 5)) {
                    (Ok(start_ms), Ok(end_ms)) => {
                        current_start_time_ms = Some(start_ms);
                        current_end_time_ms = Some(end_ms);
                        continue;
                    }
                    _ => {
                        warn!("Invalid timestamp format at line {}: {}", line_count, trimmed);
                    }
                }
            }
        }

        // Everything after the timestamp is block text
        if current_seq_num.is_some() && current_start_time_ms.is_some() {
            if !current_text.is_empty() {
                current_text.push('\n');
            }
            current_text.push_str(trimmed);
        } else {
            warn!(
                "Unexpected text at line {} before sequence number or timestamp: {}",
                line_count, trimmed
            );
        }
    }

    // Flush the last entry if the document lacks a trailing blank line
    if let (Some(seq_num), Some(start_ms), Some(end_ms)) =
        (current_seq_num, current_start_time_ms, current_end_time_ms)
    {
        finalize(seq_num, start_ms, end_ms, &current_text);
    }

    // Re-reading our own output must preserve order; repair anything else
    entries.sort_by_key(|entry| entry.start_time_ms);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.seq_num = i + 1;
    }

    Ok(entries)
}

/// Parse one captured timestamp to milliseconds
fn parse_timestamp_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64> {
    let hours: u64 = caps.get(start_idx).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let minutes: u64 = caps.get(start_idx + 1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let seconds: u64 = caps.get(start_idx + 2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let millis: u64 = caps.get(start_idx + 3).map_or(0, |m| m.as_str().parse().unwrap_or(0));

    Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
}
