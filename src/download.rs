//! Single-item downloads: one URL, one engine invocation.

use std::path::PathBuf;

use crate::config::DownloadConfig;
use crate::engine::{Engine, EngineOptions};
use crate::error::Result;
use crate::fs::{FileSystem, TokioFileSystem};
use crate::job::{JobRequest, JobResult, MediaInfo};
use crate::progress::DownloadProgress;
use crate::ytdlp::YtDlpEngine;

/// Core downloader that turns job requests into engine invocations.
pub struct Downloader<E: Engine = YtDlpEngine, F: FileSystem = TokioFileSystem> {
    engine: E,
    config: DownloadConfig,
    fs: F,
}

impl Downloader<YtDlpEngine, TokioFileSystem> {
    /// Creates a downloader running `yt-dlp` as configured.
    #[must_use]
    pub fn new(config: DownloadConfig) -> Self {
        Self {
            engine: YtDlpEngine::from_config(&config),
            config,
            fs: TokioFileSystem,
        }
    }
}

impl<E: Engine> Downloader<E, TokioFileSystem> {
    /// Creates a downloader with a custom engine.
    #[must_use]
    pub const fn with_engine(engine: E, config: DownloadConfig) -> Self {
        Self {
            engine,
            config,
            fs: TokioFileSystem,
        }
    }
}

impl<E: Engine, F: FileSystem> Downloader<E, F> {
    /// Creates a downloader with a custom engine and file system.
    #[must_use]
    pub const fn with_parts(engine: E, config: DownloadConfig, fs: F) -> Self {
        Self { engine, config, fs }
    }

    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub const fn config(&self) -> &DownloadConfig {
        &self.config
    }

    #[must_use]
    pub const fn fs(&self) -> &F {
        &self.fs
    }

    /// Downloads best video merged with best audio.
    pub async fn download_video(
        &self,
        url: &str,
        output_dir: impl Into<PathBuf>,
        progress: &dyn DownloadProgress,
    ) -> JobResult {
        self.download(JobRequest::video(url, output_dir), progress)
            .await
    }

    /// Downloads best audio and transcodes it.
    pub async fn download_audio(
        &self,
        url: &str,
        output_dir: impl Into<PathBuf>,
        progress: &dyn DownloadProgress,
    ) -> JobResult {
        self.download(JobRequest::audio(url, output_dir), progress)
            .await
    }

    /// Runs one job to completion.
    ///
    /// Failures never escape: they are reported through `progress` and
    /// returned inside the [`JobResult`].
    pub async fn download(&self, request: JobRequest, progress: &dyn DownloadProgress) -> JobResult {
        let outcome = self.run(&request, progress).await;
        match &outcome {
            Ok(info) => {
                let title = info
                    .title
                    .as_deref()
                    .unwrap_or_else(|| request.mode().fallback_title());
                progress.on_job_complete(&request, title);
            }
            Err(e) => progress.on_job_error(&request, e),
        }
        JobResult { request, outcome }
    }

    async fn run(&self, request: &JobRequest, progress: &dyn DownloadProgress) -> Result<MediaInfo> {
        self.fs.create_dir_all(request.output_dir()).await?;

        let options = EngineOptions::for_request(request, &self.config);
        progress.on_job_start(request);
        self.engine
            .download(request.url(), &options, progress)
            .await
    }
}
