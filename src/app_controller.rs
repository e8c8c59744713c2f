use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, OutputKind};
use crate::file_utils::{FileManager, FileType};
use crate::media::{AudioProcessor, MediaDownloader};
use crate::subtitle::{build_lines, coordinator, normalize};
use crate::transcription::Transcriber;
use crate::transcription::whisper::WhisperCli;

// @module: Application controller for the karaoke conversion pipeline

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.output_folder.is_empty() && !self.config.temp_folder.is_empty()
    }

    /// Run the conversion for a single input (URL or local file)
    pub async fn run(&self, input: &str, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        let output_dir = PathBuf::from(&self.config.output_folder);
        let temp_dir = PathBuf::from(&self.config.temp_folder);

        // Directory creation happens here, at the application seam; the
        // subtitle coordinator itself never creates directories
        FileManager::ensure_dir(&output_dir)?;
        FileManager::ensure_dir(&temp_dir)?;

        let progress = step_progress(8);

        let downloader = MediaDownloader::new(&temp_dir);
        let processor = AudioProcessor::new(&temp_dir, self.config.separation.timeout_secs);

        progress.set_message("Getting media");
        let (media_file, title) = downloader.get_media(input).await?;
        progress.inc(1);

        let final_output = output_dir.join(format!(
            "{}_ktv.{}",
            title,
            self.config.output_kind.extension()
        ));
        if final_output.exists() && !force_overwrite {
            progress.finish_and_clear();
            warn!(
                "Skipping input, output already exists (use -f to force overwrite): {:?}",
                final_output
            );
            return Ok(());
        }

        progress.set_message("Extracting audio");
        let audio_file = processor.extract_audio(&media_file).await?;
        progress.inc(1);

        progress.set_message("Separating vocals (this may take a few minutes)");
        let (vocals_file, instrumental_file) = processor
            .separate_vocals(&audio_file, &self.config.separation.model)
            .await?;
        progress.inc(1);

        progress.set_message("Creating KTV stereo mix");
        let ktv_mix_file = temp_dir.join(format!("{}_ktv_mix.wav", title));
        processor
            .create_ktv_stereo_mix(&vocals_file, &instrumental_file, &ktv_mix_file)
            .await?;
        progress.inc(1);

        progress.set_message("Probing media duration");
        let media_duration_secs = processor.media_duration(&audio_file).await?;
        progress.inc(1);

        progress.set_message("Transcribing lyrics (this may take a few minutes)");
        let transcriber = WhisperCli::new(
            self.config.transcription.model.as_str(),
            self.config.transcription.timeout_secs,
        );
        let output_base = FileManager::generate_output_base(&output_dir, &title);
        let subtitle_files = self
            .generate_subtitle_files(&transcriber, &vocals_file, media_duration_secs, &output_base)
            .await?;
        progress.inc(1);

        progress.set_message("Creating final output");
        match self.config.output_kind {
            OutputKind::Mp3 => {
                processor.convert_to_mp3(&ktv_mix_file, &final_output).await?;
            }
            OutputKind::Mp4 => {
                // Keep the original video stream when the source had one
                let file_type = FileManager::detect_file_type(&media_file).await?;
                let original_video =
                    (file_type == FileType::Video).then_some(media_file.as_path());
                processor.mux_video(original_video, &ktv_mix_file, &final_output).await?;
            }
        }
        progress.inc(1);

        progress.set_message("Cleaning up");
        if !self.config.keep_temp_files {
            downloader.cleanup();
        }
        progress.inc(1);
        progress.finish_and_clear();

        info!("Output file: {:?}", final_output);
        for subtitle_file in &subtitle_files {
            info!("Subtitle file: {:?}", subtitle_file);
        }
        info!(
            "KTV conversion completed in {} (left channel: instrumental, right channel: full mix)",
            format_duration(start_time.elapsed())
        );

        Ok(())
    }

    /// Run the conversion for every media file under a directory
    pub async fn run_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<()> {
        info!("Processing media folder: {:?}", input_dir);

        let media_files = FileManager::find_media_files(input_dir)?;
        if media_files.is_empty() {
            warn!("No media files found in {:?}", input_dir);
            return Ok(());
        }

        let mut processed_count = 0;
        for path in &media_files {
            info!("Processing media: {:?}", path);
            match self.run(&path.to_string_lossy(), force_overwrite).await {
                Ok(()) => processed_count += 1,
                Err(e) => error!("Error processing {:?}: {}", path, e),
            }
        }

        info!("Finished processing {} of {} files", processed_count, media_files.len());
        Ok(())
    }

    /// Transcribe a vocal stem and write the configured subtitle document(s).
    ///
    /// The subtitle half of the pipeline on its own: engine output is
    /// normalized, grouped into karaoke lines, rendered, and written next to
    /// `output_base`. An empty transcription still produces well-formed
    /// (empty-body) documents.
    pub async fn generate_subtitle_files(
        &self,
        transcriber: &dyn Transcriber,
        vocal_stem: &Path,
        media_duration_secs: f64,
        output_base: &Path,
    ) -> Result<Vec<PathBuf>> {
        let transcription = transcriber
            .transcribe(vocal_stem, self.config.transcription.forced_language())
            .await
            .context("Transcription failed")?;

        if transcription.segments.is_empty() {
            info!("No lyrics detected, writing empty subtitle document(s)");
        }

        let segments = normalize(&transcription.segments, media_duration_secs);
        let lines = build_lines(&segments, &self.config.line_policy);

        let written = coordinator::write_documents(
            &lines,
            self.config.subtitle_format,
            &self.config.ass_style,
            output_base,
        )
        .with_context(|| format!("Failed to write subtitles next to {:?}", output_base))?;

        Ok(written)
    }
}

fn step_progress(steps: u64) -> ProgressBar {
    let progress = ProgressBar::new(steps);
    progress.set_style(
        ProgressStyle::with_template("[{pos}/{len}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress
}

fn format_duration(duration: std::time::Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
