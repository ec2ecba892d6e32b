//! The seam between job orchestration and the external media engine.
//!
//! [`EngineOptions`] describes *what* the engine should do for a job; an
//! [`Engine`] implementation decides *how* to make it happen.

use async_trait::async_trait;

use crate::config::DownloadConfig;
use crate::error::Result;
use crate::job::{JobRequest, MediaInfo, MediaMode};
use crate::progress::DownloadProgress;

/// Format selector for combined video and audio.
pub const VIDEO_FORMAT: &str = "bestvideo+bestaudio/best";
/// Format selector for audio only.
pub const AUDIO_FORMAT: &str = "bestaudio/best";
/// Output filename template, relative to the output directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// A step the engine runs after the transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Extract the audio track and transcode it.
    ExtractAudio {
        codec: String,
        quality_kbps: u32,
    },
}

/// Engine configuration for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Stream selector.
    pub format: String,
    /// Full output path template.
    pub output_template: String,
    /// Container for merging separate streams, if any.
    pub merge_output_format: Option<String>,
    /// Steps to run after the transfer, in order.
    pub postprocessors: Vec<PostProcessor>,
}

impl EngineOptions {
    /// Builds the options for a request.
    #[must_use]
    pub fn for_request(request: &JobRequest, config: &DownloadConfig) -> Self {
        let output_template = request
            .output_dir()
            .join(OUTPUT_TEMPLATE)
            .to_string_lossy()
            .into_owned();

        match request.mode() {
            MediaMode::Video => Self {
                format: VIDEO_FORMAT.to_string(),
                output_template,
                merge_output_format: Some(config.merge_output_format.clone()),
                postprocessors: Vec::new(),
            },
            MediaMode::Audio => Self {
                format: AUDIO_FORMAT.to_string(),
                output_template,
                merge_output_format: None,
                postprocessors: vec![PostProcessor::ExtractAudio {
                    codec: config.audio_codec.clone(),
                    quality_kbps: config.audio_quality_kbps,
                }],
            },
        }
    }
}

/// An external media engine capable of resolving and downloading a URL.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Downloads `url` according to `options`, forwarding status events to `progress`.
    ///
    /// Resolves once the transfer and any post-processing have finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be started or reports a failure.
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        progress: &dyn DownloadProgress,
    ) -> Result<MediaInfo>;
}
