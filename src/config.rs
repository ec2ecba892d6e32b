//! Configuration types for download operations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`DownloadConfig::ytdlp_path`].
pub const ENV_YTDLP: &str = "VIDL_YTDLP";
/// Environment variable overriding [`PathConfig::output_dir`].
pub const ENV_OUTPUT_DIR: &str = "VIDL_OUTPUT_DIR";

/// Configuration passed down to the engine for every job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Engine binary, resolved through `PATH` when not absolute.
    pub ytdlp_path: String,
    /// Container that separate video and audio streams are merged into.
    pub merge_output_format: String,
    /// Codec used for audio-only transcoding.
    pub audio_codec: String,
    /// Target bitrate for audio-only transcoding, in kbit/s.
    pub audio_quality_kbps: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            merge_output_format: "mp4".to_string(),
            audio_codec: "mp3".to_string(),
            audio_quality_kbps: 192,
        }
    }
}

impl DownloadConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the engine binary.
    #[must_use]
    pub fn with_ytdlp_path(mut self, path: impl Into<String>) -> Self {
        self.ytdlp_path = path.into();
        self
    }

    /// Sets the merge container for video downloads.
    #[must_use]
    pub fn with_merge_output_format(mut self, format: impl Into<String>) -> Self {
        self.merge_output_format = format.into();
        self
    }

    /// Sets the audio codec used for audio-only downloads.
    #[must_use]
    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = codec.into();
        self
    }

    /// Sets the audio bitrate used for audio-only downloads.
    #[must_use]
    pub const fn with_audio_quality_kbps(mut self, kbps: u32) -> Self {
        self.audio_quality_kbps = kbps;
        self
    }
}

/// Path configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory where downloaded media is saved.
    pub output_dir: PathBuf,
    /// Directory holding `config.toml`. Never read from the file itself.
    #[serde(skip, default = "default_config_dir")]
    pub config_dir: PathBuf,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidl")
}

impl PathConfig {
    /// Location of the config file inside [`Self::config_dir`].
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloads"),
            config_dir: default_config_dir(),
        }
    }
}

/// Complete application configuration combining download and path settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download configuration.
    pub download: DownloadConfig,
    /// Path configuration.
    pub paths: PathConfig,
}

impl AppConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the user config file, if any, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> crate::Result<Self> {
        let config = Self::load_from(&PathConfig::default().config_file())?;
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    /// `paths.config_dir` is set to the directory containing `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let mut config: Self = match std::fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loaded config from {}", path.display());
                toml::from_str(&text)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        if let Some(dir) = path.parent() {
            config.paths.config_dir = dir.to_path_buf();
        }
        Ok(config)
    }

    /// Applies `VIDL_YTDLP` and `VIDL_OUTPUT_DIR` using the given lookup.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bin) = lookup(ENV_YTDLP).filter(|v| !v.is_empty()) {
            self.download.ytdlp_path = bin;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            self.paths.output_dir = PathBuf::from(dir);
        }
        self
    }
}
