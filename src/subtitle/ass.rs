use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::subtitle::karaoke::KaraokeLine;

// @module: Advanced SubStation Alpha rendering with karaoke tags

// Guards against binary representation error when truncating to
// centiseconds/milliseconds (2.9 * 100.0 is 289.99999... in f64)
const TRUNCATION_EPSILON: f64 = 1e-6;

/// Style parameters for the ASS document
///
/// Colours are ASS `&HAABBGGRR` strings. Most players treat PrimaryColour as
/// the unsung text and SecondaryColour as the sung sweep, so `primary_colour`
/// here is the not-yet-highlighted colour and `highlight_colour` the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssStyle {
    /// Font family name
    #[serde(default = "default_font_name")]
    pub font_name: String,

    /// Font size in script pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Colour of text not yet sung
    #[serde(default = "default_primary_colour")]
    pub primary_colour: String,

    /// Colour swept across each word as it is sung
    #[serde(default = "default_highlight_colour")]
    pub highlight_colour: String,

    /// Outline colour
    #[serde(default = "default_outline_colour")]
    pub outline_colour: String,

    /// Shadow/box colour
    #[serde(default = "default_back_colour")]
    pub back_colour: String,

    /// Script horizontal resolution
    #[serde(default = "default_play_res_x")]
    pub play_res_x: u32,

    /// Script vertical resolution
    #[serde(default = "default_play_res_y")]
    pub play_res_y: u32,

    /// Show the upcoming line unhighlighted while the current one is sung
    #[serde(default = "default_true")]
    pub next_line_preview: bool,
}

impl Default for AssStyle {
    fn default() -> Self {
        AssStyle {
            font_name: default_font_name(),
            font_size: default_font_size(),
            primary_colour: default_primary_colour(),
            highlight_colour: default_highlight_colour(),
            outline_colour: default_outline_colour(),
            back_colour: default_back_colour(),
            play_res_x: default_play_res_x(),
            play_res_y: default_play_res_y(),
            next_line_preview: true,
        }
    }
}

fn default_font_name() -> String {
    "Arial".to_string()
}

fn default_font_size() -> u32 {
    48
}

fn default_primary_colour() -> String {
    // White, unsung
    "&H00FFFFFF".to_string()
}

fn default_highlight_colour() -> String {
    // Blue, sung
    "&H00FF0000".to_string()
}

fn default_outline_colour() -> String {
    "&H00000000".to_string()
}

fn default_back_colour() -> String {
    "&H64000000".to_string()
}

fn default_play_res_x() -> u32 {
    1280
}

fn default_play_res_y() -> u32 {
    720
}

fn default_true() -> bool {
    true
}

/// Render the full ASS document for the given lines.
///
/// Lines must already be in ascending start-time order; the renderer does
/// not re-sort. A line with no words or a non-positive duration is an
/// internal defect and errors rather than emitting a malformed event. An
/// empty line sequence produces a header-only document.
pub fn render(lines: &[KaraokeLine], style: &AssStyle) -> Result<String, SubtitleError> {
    for line in lines {
        validate_line(line)?;
    }

    let mut output = String::with_capacity(lines.len() * 160 + 1024);

    write_header(&mut output, style)?;

    writeln!(output, "[Events]")?;
    writeln!(
        output,
        "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
    )?;

    // The sung line, with per-word sweep timing
    for (idx, line) in lines.iter().enumerate() {
        let karaoke = karaoke_text(line)?;
        writeln!(
            output,
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            format_ass_time(line.start),
            format_ass_time(line.end),
            style_name(idx),
            karaoke
        )?;
    }

    // The upcoming line, plain, shown without interruption until it starts
    if style.next_line_preview {
        for i in 0..lines.len().saturating_sub(1) {
            let current = &lines[i];
            let next = &lines[i + 1];

            let preview_start = current.start;
            let preview_end = current.end.max(next.start);
            if preview_end <= preview_start {
                continue;
            }

            writeln!(
                output,
                "Dialogue: 0,{},{},{},,0,0,0,,{}",
                format_ass_time(preview_start),
                format_ass_time(preview_end),
                style_name(i + 1),
                next.text()
            )?;
        }
    }

    Ok(output)
}

fn validate_line(line: &KaraokeLine) -> Result<(), SubtitleError> {
    if line.words.is_empty() {
        return Err(SubtitleError::EmptyLine { start_secs: line.start });
    }
    if line.end <= line.start {
        return Err(SubtitleError::InvalidTimeRange {
            start_secs: line.start,
            end_secs: line.end,
        });
    }
    Ok(())
}

fn write_header(output: &mut String, style: &AssStyle) -> Result<(), SubtitleError> {
    writeln!(output, "[Script Info]")?;
    writeln!(output, "Title: Karaoke Subtitles")?;
    writeln!(output, "ScriptType: v4.00+")?;
    writeln!(output, "WrapStyle: 0")?;
    writeln!(output, "PlayResX: {}", style.play_res_x)?;
    writeln!(output, "PlayResY: {}", style.play_res_y)?;
    writeln!(output, "ScaledBorderAndShadow: yes")?;
    writeln!(output)?;

    writeln!(output, "[V4+ Styles]")?;
    writeln!(
        output,
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding"
    )?;
    // Odd lines sit higher and lean left, even lines lower and lean right,
    // the usual KTV two-line layout
    writeln!(
        output,
        "Style: Left,{},{},{},{},{},{},-1,0,0,0,100,100,0,0,1,3,0,1,260,10,90,1",
        style.font_name,
        style.font_size,
        style.primary_colour,
        style.highlight_colour,
        style.outline_colour,
        style.back_colour
    )?;
    writeln!(
        output,
        "Style: Right,{},{},{},{},{},{},-1,0,0,0,100,100,0,0,1,3,0,3,260,260,50,1",
        style.font_name,
        style.font_size,
        style.primary_colour,
        style.highlight_colour,
        style.outline_colour,
        style.back_colour
    )?;
    writeln!(output)?;

    Ok(())
}

fn style_name(line_index: usize) -> &'static str {
    if line_index % 2 == 0 { "Left" } else { "Right" }
}

/// Build the `{\k}`-tagged text for one line.
///
/// Word tags carry the word's truncated centisecond duration; silence inside
/// the line becomes an empty-text gap tag, and the final word's tag is
/// recomputed from the line end, so the sum of all tags in a line equals the
/// line duration in centiseconds exactly.
fn karaoke_text(line: &KaraokeLine) -> Result<String, SubtitleError> {
    let line_start_cs = to_centiseconds(line.start);
    let line_end_cs = to_centiseconds(line.end);

    let mut text = String::new();
    let mut cursor_cs = line_start_cs;

    let last = line.words.len() - 1;
    for (i, word) in line.words.iter().enumerate() {
        let word_start_cs = to_centiseconds(word.start).max(cursor_cs);

        let gap_cs = word_start_cs - cursor_cs;
        if gap_cs > 0 {
            write!(text, "{{\\k{gap_cs}}}")?;
            cursor_cs = word_start_cs;
        }

        let duration_cs = if i == last {
            // Absorb accumulated truncation error into the last word
            (line_end_cs - cursor_cs).max(1)
        } else {
            (to_centiseconds(word.end) - word_start_cs).max(1)
        };

        write!(text, "{{\\k{duration_cs}}}{}", word.text)?;
        if i != last {
            text.push(' ');
        }
        cursor_cs += duration_cs;
    }

    Ok(text)
}

/// Truncate seconds to centiseconds (never round, to avoid cumulative drift)
pub fn to_centiseconds(secs: f64) -> i64 {
    (secs.max(0.0) * 100.0 + TRUNCATION_EPSILON).floor() as i64
}

/// Format a timestamp in seconds as ASS `H:MM:SS.cc`
pub fn format_ass_time(secs: f64) -> String {
    let total_cs = to_centiseconds(secs);
    let cs = total_cs % 100;
    let total_seconds = total_cs / 100;
    let seconds = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let minutes = total_minutes % 60;
    let hours = total_minutes / 60;
    format!("{hours}:{minutes:02}:{seconds:02}.{cs:02}")
}
