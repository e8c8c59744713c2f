// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, OutputKind};
use crate::subtitle::coordinator::SubtitleFormat;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod language_utils;
mod media;
mod subtitle;
mod transcription;

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubtitleFormat {
    Ass,
    Srt,
    Both,
}

impl From<CliSubtitleFormat> for SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Ass => SubtitleFormat::Ass,
            CliSubtitleFormat::Srt => SubtitleFormat::Srt,
            CliSubtitleFormat::Both => SubtitleFormat::Both,
        }
    }
}

/// CLI Wrapper for OutputKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliOutputKind {
    Mp3,
    Mp4,
}

impl From<CliOutputKind> for OutputKind {
    fn from(cli_kind: CliOutputKind) -> Self {
        match cli_kind {
            CliOutputKind::Mp3 => OutputKind::Mp3,
            CliOutputKind::Mp4 => OutputKind::Mp4,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a media source into a karaoke mix with subtitles (default command)
    #[command(alias = "convert")]
    Convert(ConvertArgs),

    /// Generate shell completions for yakara
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// YouTube URL, local media file, or directory of media files
    #[arg(value_name = "INPUT")]
    input: String,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output folder for the final mix and subtitles
    #[arg(short, long)]
    output_folder: Option<String>,

    /// Subtitle format(s) to produce
    #[arg(short, long, value_enum)]
    subtitle_format: Option<CliSubtitleFormat>,

    /// Final media output kind
    #[arg(short = 'k', long, value_enum)]
    output_kind: Option<CliOutputKind>,

    /// Whisper model name (tiny, base, small, medium, large)
    #[arg(short, long)]
    model: Option<String>,

    /// Transcription language code (e.g., 'en', 'zh'), or 'auto'
    #[arg(short, long)]
    language: Option<String>,

    /// Keep intermediate files after the run
    #[arg(long)]
    keep_temp: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// yakara - Yet Another KARAoke generator
///
/// Converts a YouTube URL or local media file into a karaoke-ready stereo
/// mix (instrumental left, full mix right) with synchronized subtitles.
#[derive(Parser, Debug)]
#[command(name = "yakara")]
#[command(version = "1.0.0")]
#[command(about = "Karaoke mix and subtitle generator")]
#[command(long_about = "yakara downloads or stages a media source, separates the vocals, builds
the classic KTV stereo layout, and generates karaoke subtitles from a
word-level transcription of the vocal stem.

EXAMPLES:
    yakara song.mp4                              # Convert using default config
    yakara -f song.mp4                           # Force overwrite existing files
    yakara -s both song.mp4                      # Write ASS and SRT subtitles
    yakara -k mp3 song.mp4                       # Audio-only output
    yakara -m small -l zh song.mp4               # Whisper model and language
    yakara https://youtube.com/watch?v=...       # Download and convert
    yakara /music/                               # Convert every media file in a folder
    yakara completions bash > yakara.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.

EXTERNAL TOOLS:
    ffmpeg/ffprobe - audio extraction, stereo mix, muxing
    demucs         - vocal separation
    whisper        - transcription with word timestamps
    yt-dlp         - URL downloads")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// YouTube URL, local media file, or directory of media files
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output folder for the final mix and subtitles
    #[arg(short, long)]
    output_folder: Option<String>,

    /// Subtitle format(s) to produce
    #[arg(short, long, value_enum)]
    subtitle_format: Option<CliSubtitleFormat>,

    /// Final media output kind
    #[arg(short = 'k', long, value_enum)]
    output_kind: Option<CliOutputKind>,

    /// Whisper model name (tiny, base, small, medium, large)
    #[arg(short, long)]
    model: Option<String>,

    /// Transcription language code (e.g., 'en', 'zh'), or 'auto'
    #[arg(short, long)]
    language: Option<String>,

    /// Keep intermediate files after the run
    #[arg(long)]
    keep_temp: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Colour code for log level
    fn get_colour_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let colour = Self::get_colour_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", colour, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yakara", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input = cli
                .input
                .ok_or_else(|| anyhow!("INPUT is required when no subcommand is specified"))?;

            let convert_args = ConvertArgs {
                input,
                force_overwrite: cli.force_overwrite,
                output_folder: cli.output_folder,
                subtitle_format: cli.subtitle_format,
                output_kind: cli.output_kind,
                model: cli.model,
                language: cli.language,
                keep_temp: cli.keep_temp,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_convert(convert_args).await
        }
    }
}

async fn run_convert(options: ConvertArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(to_level_filter(&cmd_log_level.clone().into()));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    apply_cli_overrides(&mut config, &options);

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(to_level_filter(&config.log_level));
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    // A directory input means batch mode
    let input_path = PathBuf::from(&options.input);
    if input_path.is_dir() {
        controller.run_folder(&input_path, options.force_overwrite).await
    } else {
        controller.run(&options.input, options.force_overwrite).await
    }
}

fn apply_cli_overrides(config: &mut Config, options: &ConvertArgs) {
    if let Some(output_folder) = &options.output_folder {
        config.output_folder = output_folder.clone();
    }

    if let Some(format) = &options.subtitle_format {
        config.subtitle_format = format.clone().into();
    }

    if let Some(kind) = &options.output_kind {
        config.output_kind = kind.clone().into();
    }

    if let Some(model) = &options.model {
        config.transcription.model = model.clone();
    }

    if let Some(language) = &options.language {
        config.transcription.language = language.clone();
    }

    if options.keep_temp {
        config.keep_temp_files = true;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

fn to_level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
