//! Progress events and the observer trait that receives them.

use std::path::Path;

use crate::error::Error;
use crate::job::JobRequest;
use crate::stats::BatchTally;

/// Status event emitted by the engine while a job runs.
///
/// The strings are pre-formatted by the engine (e.g. `" 42.0%"`,
/// `"1.20MiB/s"`, `"00:13"`) and passed through untouched apart from trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Transfer in progress.
    Downloading {
        percent: Option<String>,
        speed: Option<String>,
        eta: Option<String>,
    },
    /// Transfer finished; post-processing may follow.
    Finished,
}

/// Trait for receiving download progress updates.
///
/// Implement this trait to receive callbacks during download operations.
/// All methods have default no-op implementations for convenience.
pub trait DownloadProgress: Send + Sync {
    /// Called before the engine is invoked for a job.
    fn on_job_start(&self, _request: &JobRequest) {}

    /// Called for every status event the engine emits.
    fn on_status(&self, _event: &ProgressEvent) {}

    /// Called when a job completes successfully.
    fn on_job_complete(&self, _request: &JobRequest, _title: &str) {}

    /// Called when a job fails.
    fn on_job_error(&self, _request: &JobRequest, _error: &Error) {}

    /// Called once the batch URL list has been read.
    fn on_batch_start(&self, _total: usize) {}

    /// Called before each batch item; `index` is 1-based.
    fn on_batch_item(&self, _index: usize, _total: usize) {}

    /// Called after the last batch item.
    fn on_batch_complete(&self, _tally: &BatchTally) {}

    /// Called when the batch URL list does not exist.
    fn on_batch_file_missing(&self, _path: &Path) {}
}

/// A null progress implementation that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {}

/// Progress sink that writes through the `log` facade instead of the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl DownloadProgress for LogProgress {
    fn on_job_start(&self, request: &JobRequest) {
        log::info!("Starting {} download: {}", request.mode(), request.url());
    }

    fn on_status(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Downloading {
                percent,
                speed,
                eta,
            } => log::debug!(
                "progress={} speed={} eta={}",
                percent.as_deref().unwrap_or("N/A"),
                speed.as_deref().unwrap_or("N/A"),
                eta.as_deref().unwrap_or("N/A"),
            ),
            ProgressEvent::Finished => log::info!("Transfer finished, post-processing"),
        }
    }

    fn on_job_complete(&self, request: &JobRequest, title: &str) {
        log::info!("Downloaded {title} ({})", request.url());
    }

    fn on_job_error(&self, request: &JobRequest, error: &Error) {
        log::error!("Download failed for {}: {error}", request.url());
    }

    fn on_batch_start(&self, total: usize) {
        log::info!("Batch of {total} URL(s)");
    }

    fn on_batch_item(&self, index: usize, total: usize) {
        log::info!("Batch item {index}/{total}");
    }

    fn on_batch_complete(&self, tally: &BatchTally) {
        log::info!("Batch complete: {tally} successful downloads");
    }

    fn on_batch_file_missing(&self, path: &Path) {
        log::error!("Batch file not found: {}", path.display());
    }
}
