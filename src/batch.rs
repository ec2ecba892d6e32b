//! Batch mode: a file of URLs processed one after another.

use std::path::{Path, PathBuf};

use crate::download::Downloader;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::progress::DownloadProgress;
use crate::stats::BatchTally;

/// Extracts URLs from a batch file: one per line, trimmed, blank lines skipped.
#[must_use]
pub fn read_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Downloads every URL in `path` as a video job into `output_dir`.
///
/// Items are attempted in file order and a failed item never stops the batch.
///
/// # Errors
///
/// Returns [`Error::BatchFileNotFound`] without attempting any download if the
/// file does not exist, or an I/O error if it cannot be read.
pub async fn run_batch<E: Engine, F: FileSystem>(
    downloader: &Downloader<E, F>,
    path: &Path,
    output_dir: &Path,
    progress: &dyn DownloadProgress,
) -> Result<BatchTally> {
    let text = match downloader.fs().read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            progress.on_batch_file_missing(path);
            return Err(Error::BatchFileNotFound {
                path: PathBuf::from(path),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let urls = read_url_list(&text);
    let total = urls.len();
    progress.on_batch_start(total);
    log::info!("Batch {}: {total} URL(s)", path.display());

    let mut tally = BatchTally::new();
    for (i, url) in urls.iter().enumerate() {
        progress.on_batch_item(i + 1, total);
        let result = downloader.download_video(url, output_dir, progress).await;
        tally.record(result.succeeded());
    }

    progress.on_batch_complete(&tally);
    Ok(tally)
}
