//! Job request and result types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// What a job should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaMode {
    /// Best video merged with best audio.
    #[default]
    Video,
    /// Best audio only, transcoded.
    Audio,
}

impl MediaMode {
    /// Title to show when the engine does not report one.
    #[must_use]
    pub const fn fallback_title(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Video => "video",
            Self::Audio => "audio",
        })
    }
}

/// One URL-to-local-file download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    url: String,
    output_dir: PathBuf,
    mode: MediaMode,
}

impl JobRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>, mode: MediaMode) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            mode,
        }
    }

    /// Shorthand for a video request.
    #[must_use]
    pub fn video(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self::new(url, output_dir, MediaMode::Video)
    }

    /// Shorthand for an audio-only request.
    #[must_use]
    pub fn audio(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self::new(url, output_dir, MediaMode::Audio)
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub const fn mode(&self) -> MediaMode {
        self.mode
    }
}

/// Metadata the engine reports once the media is on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaInfo {
    /// Media title.
    #[serde(default)]
    pub title: Option<String>,
    /// Extractor-specific media id.
    #[serde(default)]
    pub id: Option<String>,
    /// Final path after post-processing.
    #[serde(default)]
    pub filepath: Option<PathBuf>,
}

/// Outcome of a single job.
#[derive(Debug)]
pub struct JobResult {
    /// The request that was attempted.
    pub request: JobRequest,
    /// Engine metadata on success, the failure otherwise.
    pub outcome: Result<MediaInfo, Error>,
}

impl JobResult {
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Reported title, if the job succeeded and the engine supplied one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.outcome.as_ref().ok().and_then(|info| info.title.as_deref())
    }

    /// Title for display, falling back to the mode name.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title()
            .unwrap_or_else(|| self.request.mode().fallback_title())
    }

    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }
}
