use std::path::{Path, PathBuf};
use log::{debug, error, info};
use tokio::process::Command;

use crate::errors::MediaError;

// @module: Audio extraction, vocal separation, and the KTV stereo mix

// @const: Timeout for one ffmpeg/ffprobe invocation
const FFMPEG_TIMEOUT_SECS: u64 = 600;

// @struct: Audio pipeline over external tools
#[derive(Debug)]
pub struct AudioProcessor {
    // @field: Temp workspace for intermediate files
    temp_dir: PathBuf,

    // @field: Timeout for the demucs separation run
    separation_timeout_secs: u64,
}

impl AudioProcessor {
    // @creates: Processor rooted at the given temp workspace
    pub fn new<P: AsRef<Path>>(temp_dir: P, separation_timeout_secs: u64) -> Self {
        AudioProcessor {
            temp_dir: temp_dir.as_ref().to_path_buf(),
            separation_timeout_secs,
        }
    }

    /// Extract the audio track as stereo 44.1 kHz PCM WAV
    pub async fn extract_audio(&self, input_file: &Path) -> Result<PathBuf, MediaError> {
        info!("Extracting audio from: {:?}", input_file);

        let stem = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let output_file = self.temp_dir.join(format!("{}_audio.wav", stem));

        run_ffmpeg(
            &[
                "-i",
                input_file.to_str().unwrap_or_default(),
                "-vn",
                "-acodec",
                "pcm_s16le",
                "-ar",
                "44100",
                "-ac",
                "2",
                "-y",
                output_file.to_str().unwrap_or_default(),
            ],
            FFMPEG_TIMEOUT_SECS,
        )
        .await?;

        debug!("Audio extracted to: {:?}", output_file);
        Ok(output_file)
    }

    /// Separate vocals from the accompaniment with demucs.
    ///
    /// Returns (vocals, instrumental).
    pub async fn separate_vocals(
        &self,
        audio_file: &Path,
        model: &str,
    ) -> Result<(PathBuf, PathBuf), MediaError> {
        info!("Separating vocals using demucs model: {}", model);

        let output_dir = self.temp_dir.join("separated");
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| MediaError::SeparationFailed(format!("Failed to create output dir: {}", e)))?;

        let separation_future = Command::new("demucs")
            .args([
                "--two-stems",
                "vocals",
                "-n",
                model,
                "-o",
                output_dir.to_str().unwrap_or_default(),
                audio_file.to_str().unwrap_or_default(),
            ])
            .output();

        let timeout_duration = std::time::Duration::from_secs(self.separation_timeout_secs);
        let result = tokio::select! {
            result = separation_future => {
                result.map_err(|e| MediaError::SeparationFailed(format!(
                    "Failed to execute demucs (is it installed?): {}", e
                )))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(MediaError::Timeout {
                    tool: "demucs".to_string(),
                    seconds: self.separation_timeout_secs,
                });
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            error!("Demucs error: {}", stderr.trim());
            return Err(MediaError::SeparationFailed(stderr.trim().to_string()));
        }

        // demucs writes <out>/<model>/<stem>/{vocals,no_vocals}.wav
        let stem = audio_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let separated_dir = output_dir.join(model).join(&stem);
        let vocals_file = separated_dir.join("vocals.wav");
        let instrumental_file = separated_dir.join("no_vocals.wav");

        if !vocals_file.exists() || !instrumental_file.exists() {
            return Err(MediaError::SeparationFailed(
                "Demucs did not produce expected output files".to_string(),
            ));
        }

        debug!("Vocals: {:?}", vocals_file);
        debug!("Instrumental: {:?}", instrumental_file);
        Ok((vocals_file, instrumental_file))
    }

    /// Build the KTV stereo mix: instrumental only on the left channel,
    /// instrumental plus vocals on the right, so a player's balance knob
    /// switches between karaoke and the original song.
    pub async fn create_ktv_stereo_mix(
        &self,
        vocals_file: &Path,
        instrumental_file: &Path,
        output_file: &Path,
    ) -> Result<PathBuf, MediaError> {
        info!("Creating KTV stereo mix");

        let filter = "[0:a]asplit=2[inst_l][inst_r];\
                      [inst_r][1:a]amix=inputs=2:duration=shortest[full];\
                      [inst_l]pan=mono|c0=0.5*c0+0.5*c1[left];\
                      [full]pan=mono|c0=0.5*c0+0.5*c1[right];\
                      [left][right]join=inputs=2:channel_layout=stereo[ktv]";

        run_ffmpeg(
            &[
                "-i",
                instrumental_file.to_str().unwrap_or_default(),
                "-i",
                vocals_file.to_str().unwrap_or_default(),
                "-filter_complex",
                filter,
                "-map",
                "[ktv]",
                "-y",
                output_file.to_str().unwrap_or_default(),
            ],
            FFMPEG_TIMEOUT_SECS,
        )
        .await?;

        debug!("KTV stereo mix created: {:?}", output_file);
        Ok(output_file.to_path_buf())
    }

    /// Encode a WAV to MP3 at 320k
    pub async fn convert_to_mp3(
        &self,
        input_file: &Path,
        output_file: &Path,
    ) -> Result<PathBuf, MediaError> {
        info!("Converting to MP3: {:?}", output_file);

        run_ffmpeg(
            &[
                "-i",
                input_file.to_str().unwrap_or_default(),
                "-codec:a",
                "libmp3lame",
                "-b:a",
                "320k",
                "-y",
                output_file.to_str().unwrap_or_default(),
            ],
            FFMPEG_TIMEOUT_SECS,
        )
        .await?;

        Ok(output_file.to_path_buf())
    }

    /// Mux the KTV audio under the original video stream, or under a
    /// synthesized black frame when the source was audio-only
    pub async fn mux_video(
        &self,
        original_video: Option<&Path>,
        ktv_audio: &Path,
        output_file: &Path,
    ) -> Result<PathBuf, MediaError> {
        info!("Creating MP4 with KTV audio: {:?}", output_file);

        match original_video {
            Some(video) if video.exists() => {
                run_ffmpeg(
                    &[
                        "-i",
                        video.to_str().unwrap_or_default(),
                        "-i",
                        ktv_audio.to_str().unwrap_or_default(),
                        "-c:v",
                        "copy",
                        "-c:a",
                        "aac",
                        "-b:a",
                        "320k",
                        "-map",
                        "0:v:0",
                        "-map",
                        "1:a:0",
                        "-shortest",
                        "-y",
                        output_file.to_str().unwrap_or_default(),
                    ],
                    FFMPEG_TIMEOUT_SECS,
                )
                .await?;
            }
            _ => {
                info!("No video available, creating video with static background");
                run_ffmpeg(
                    &[
                        "-f",
                        "lavfi",
                        "-i",
                        "color=c=black:s=1280x720:r=25",
                        "-i",
                        ktv_audio.to_str().unwrap_or_default(),
                        "-map",
                        "0:v",
                        "-map",
                        "1:a",
                        "-c:v",
                        "libx264",
                        "-c:a",
                        "aac",
                        "-b:a",
                        "320k",
                        "-shortest",
                        "-y",
                        output_file.to_str().unwrap_or_default(),
                    ],
                    FFMPEG_TIMEOUT_SECS,
                )
                .await?;
            }
        }

        Ok(output_file.to_path_buf())
    }

    /// Probe the media duration in seconds
    pub async fn media_duration(&self, media_file: &Path) -> Result<f64, MediaError> {
        let probe_future = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                media_file.to_str().unwrap_or_default(),
            ])
            .output();

        let timeout_duration = std::time::Duration::from_secs(60);
        let output = tokio::select! {
            result = probe_future => {
                result.map_err(|e| MediaError::FfmpegFailed(format!(
                    "Failed to execute ffprobe command: {}", e
                )))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(MediaError::Timeout { tool: "ffprobe".to_string(), seconds: 60 });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::FfmpegFailed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse::<f64>()
            .map_err(|e| MediaError::FfmpegFailed(format!("Unparseable duration {:?}: {}", stdout.trim(), e)))
    }
}

/// Run one ffmpeg invocation with a timeout, surfacing only the meaningful
/// part of stderr on failure
async fn run_ffmpeg(args: &[&str], timeout_secs: u64) -> Result<(), MediaError> {
    let ffmpeg_future = Command::new("ffmpeg").args(args).output();

    let timeout_duration = std::time::Duration::from_secs(timeout_secs);
    let result = tokio::select! {
        result = ffmpeg_future => {
            result.map_err(|e| MediaError::FfmpegFailed(format!(
                "Failed to execute ffmpeg command: {}", e
            )))?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(MediaError::Timeout { tool: "ffmpeg".to_string(), seconds: timeout_secs });
        }
    };

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let filtered = filter_ffmpeg_stderr(&stderr);
        error!("ffmpeg failed: {}", filtered);
        return Err(MediaError::FfmpegFailed(filtered));
    }

    Ok(())
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let dominated_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !dominated_prefixes.iter().any(|p| line.starts_with(p) || trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
