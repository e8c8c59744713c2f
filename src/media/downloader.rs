use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use tokio::process::Command;
use url::Url;

use crate::errors::MediaError;

// @module: Media acquisition from URLs or local files

// @const: Download timeout
const DOWNLOAD_TIMEOUT_SECS: u64 = 1800;

/// How the input argument should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A URL to download with yt-dlp
    Url,
    /// An existing local media file
    LocalFile,
}

/// Classify an input argument as a URL or a local file path
pub fn classify_input(input: &str) -> InputKind {
    match Url::parse(input) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => InputKind::Url,
        _ => InputKind::LocalFile,
    }
}

// @struct: Stages media into the temp workspace
#[derive(Debug)]
pub struct MediaDownloader {
    // @field: Temp workspace for downloaded/copied media
    temp_dir: PathBuf,

    // @field: Optional cookies file passed to yt-dlp
    cookies_file: Option<PathBuf>,
}

impl MediaDownloader {
    // @creates: Downloader rooted at the given temp workspace
    pub fn new<P: AsRef<Path>>(temp_dir: P) -> Self {
        // yt-dlp needs a cookies file for age-gated or login-walled videos
        let default_cookies = PathBuf::from("cookies.txt");
        let cookies_file = default_cookies.exists().then_some(default_cookies);

        MediaDownloader { temp_dir: temp_dir.as_ref().to_path_buf(), cookies_file }
    }

    /// Use a specific cookies file for downloads
    pub fn with_cookies<P: AsRef<Path>>(mut self, cookies: P) -> Self {
        self.cookies_file = Some(cookies.as_ref().to_path_buf());
        self
    }

    /// Stage the input into the temp workspace.
    ///
    /// Returns the staged media path and a title usable as an output stem.
    pub async fn get_media(&self, input: &str) -> Result<(PathBuf, String), MediaError> {
        match classify_input(input) {
            InputKind::Url => self.download_media(input).await,
            InputKind::LocalFile => self.copy_local_file(Path::new(input)),
        }
    }

    /// Download a URL with yt-dlp into the temp workspace
    pub async fn download_media(&self, url: &str) -> Result<(PathBuf, String), MediaError> {
        info!("Downloading media from URL: {}", url);

        let output_template = self.temp_dir.join("%(title)s.%(ext)s");

        let mut args: Vec<String> = vec![
            "-f".to_string(),
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string(),
            "-o".to_string(),
            output_template.to_string_lossy().to_string(),
            "--no-warnings".to_string(),
            // Print the final path while still downloading
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];

        if let Some(cookies) = &self.cookies_file {
            info!("Using cookies file: {:?}", cookies);
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().to_string());
        } else {
            debug!("No cookies.txt found, downloading without cookies");
        }

        args.push(url.to_string());

        let download_future = Command::new("yt-dlp").args(&args).output();

        let timeout_duration = std::time::Duration::from_secs(DOWNLOAD_TIMEOUT_SECS);
        let result = tokio::select! {
            result = download_future => {
                result.map_err(|e| MediaError::DownloadFailed(format!(
                    "Failed to execute yt-dlp (is it installed?): {}", e
                )))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(MediaError::Timeout {
                    tool: "yt-dlp".to_string(),
                    seconds: DOWNLOAD_TIMEOUT_SECS,
                });
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MediaError::DownloadFailed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&result.stdout);
        let downloaded = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .next_back()
            .map(PathBuf::from)
            .ok_or_else(|| {
                MediaError::DownloadFailed("yt-dlp did not report a downloaded file".to_string())
            })?;

        if !downloaded.exists() {
            return Err(MediaError::DownloadFailed(format!(
                "yt-dlp reported {:?} but the file does not exist",
                downloaded
            )));
        }

        let title = downloaded
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "download".to_string());

        info!("Downloaded: {:?}", downloaded);
        Ok((downloaded, title))
    }

    /// Copy a local file into the temp workspace
    pub fn copy_local_file(&self, file_path: &Path) -> Result<(PathBuf, String), MediaError> {
        if !file_path.exists() {
            return Err(MediaError::InvalidInput(format!("File not found: {:?}", file_path)));
        }
        if !file_path.is_file() {
            return Err(MediaError::InvalidInput(format!("Path is not a file: {:?}", file_path)));
        }

        info!("Copying local file: {:?}", file_path);

        let file_name = file_path
            .file_name()
            .ok_or_else(|| MediaError::InvalidInput(format!("Invalid file name: {:?}", file_path)))?;
        let dest_path = self.temp_dir.join(file_name);

        std::fs::copy(file_path, &dest_path)
            .map_err(|e| MediaError::InvalidInput(format!("Failed to copy file: {}", e)))?;

        let title = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "media".to_string());

        debug!("Copied to: {:?}", dest_path);
        Ok((dest_path, title))
    }

    /// Remove the temp workspace and everything in it
    pub fn cleanup(&self) {
        if self.temp_dir.exists() {
            info!("Cleaning up temp folder: {:?}", self.temp_dir);
            if let Err(e) = std::fs::remove_dir_all(&self.temp_dir) {
                warn!("Failed to clean temp folder {:?}: {}", self.temp_dir, e);
            }
        }
    }
}
