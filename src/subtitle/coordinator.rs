use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::subtitle::ass::{self, AssStyle};
use crate::subtitle::karaoke::KaraokeLine;
use crate::subtitle::srt;

// @module: Format dispatch and document writing

/// Which subtitle document(s) a run should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    // @format: ASS with per-word karaoke tags
    #[default]
    Ass,
    // @format: Plain SRT fallback
    Srt,
    // @format: Both documents
    Both,
}

impl SubtitleFormat {
    /// File extensions this selection produces, in emission order
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Ass => &["ass"],
            Self::Srt => &["srt"],
            Self::Both => &["ass", "srt"],
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ass => "ass",
            Self::Srt => "srt",
            Self::Both => "both",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ass" => Ok(Self::Ass),
            "srt" => Ok(Self::Srt),
            "both" => Ok(Self::Both),
            other => Err(SubtitleError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Render the requested format(s) and write each to `<output_base>.<ext>`.
///
/// Every document is rendered fully in memory and written with a single
/// call, so a mid-render failure leaves no corrupt file behind. The parent
/// directory must already exist; this layer never creates directories. In a
/// `Both` request a failure on one format does not abort the sibling; all
/// failures are reported together once both have been attempted.
///
/// Returns the paths written, in emission order.
pub fn write_documents(
    lines: &[KaraokeLine],
    format: SubtitleFormat,
    style: &AssStyle,
    output_base: &Path,
) -> Result<Vec<PathBuf>, SubtitleError> {
    validate_output_base(output_base)?;

    let mut written = Vec::new();
    let mut failures: Vec<(PathBuf, SubtitleError)> = Vec::new();

    for ext in format.extensions() {
        let path = with_extension(output_base, ext);
        match write_one(lines, ext, style, &path) {
            Ok(()) => {
                info!("Subtitle file created: {:?}", path);
                written.push(path);
            }
            Err(e) => {
                error!("Failed to write {:?}: {}", path, e);
                failures.push((path, e));
            }
        }
    }

    if failures.is_empty() {
        return Ok(written);
    }

    if format != SubtitleFormat::Both {
        // Single-format request: surface the renderer/write error directly
        let (_, e) = failures.remove(0);
        return Err(e);
    }

    Err(SubtitleError::PartialWrite {
        failed: failures.len(),
        requested: format.extensions().len(),
        details: failures
            .iter()
            .map(|(path, e)| format!("{:?}: {}", path, e))
            .collect::<Vec<_>>()
            .join("; "),
    })
}

fn write_one(
    lines: &[KaraokeLine],
    ext: &str,
    style: &AssStyle,
    path: &Path,
) -> Result<(), SubtitleError> {
    let document = match ext {
        "ass" => ass::render(lines, style)?,
        "srt" => srt::render(lines)?,
        other => return Err(SubtitleError::UnsupportedFormat(other.to_string())),
    };

    std::fs::write(path, document).map_err(|e| SubtitleError::OutputPath {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn validate_output_base(output_base: &Path) -> Result<(), SubtitleError> {
    if let Some(parent) = output_base.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(SubtitleError::OutputPath {
                path: output_base.to_path_buf(),
                reason: "parent directory does not exist".to_string(),
            });
        }
    }
    Ok(())
}

fn with_extension(output_base: &Path, ext: &str) -> PathBuf {
    let mut os_string = output_base.as_os_str().to_os_string();
    os_string.push(".");
    os_string.push(ext);
    PathBuf::from(os_string)
}
