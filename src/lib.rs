//! vidl - download video or audio from media sites via `yt-dlp`.
//!
//! The library turns URLs into [`JobRequest`]s, builds [`EngineOptions`] for
//! them and hands them to an [`Engine`]. Progress and outcomes are reported
//! through a [`DownloadProgress`] observer, abstracted from any specific UI.
//!
//! # Example
//!
//! ```no_run
//! use vidl::{DownloadConfig, Downloader, LogProgress};
//!
//! # async fn example() -> vidl::Result<()> {
//! let downloader = Downloader::new(DownloadConfig::default());
//!
//! let result = downloader
//!     .download_audio("https://example.com/watch?v=abc", "downloads", &LogProgress)
//!     .await;
//! println!("{}: {}", result.succeeded(), result.display_title());
//!
//! let tally = vidl::run_batch(
//!     &downloader,
//!     std::path::Path::new("urls.txt"),
//!     std::path::Path::new("downloads"),
//!     &LogProgress,
//! )
//! .await?;
//! println!("{tally} successful downloads");
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod download;
pub mod engine;
pub mod error;
pub mod fs;
pub mod job;
pub mod progress;
pub mod stats;
pub mod ytdlp;

// Re-export main types for convenience
pub use batch::{read_url_list, run_batch};
pub use config::{AppConfig, DownloadConfig, PathConfig};
pub use download::Downloader;
pub use engine::{Engine, EngineOptions, PostProcessor};
pub use error::{Error, Result};
pub use fs::{FileSystem, TokioFileSystem};
pub use job::{JobRequest, JobResult, MediaInfo, MediaMode};
pub use progress::{DownloadProgress, LogProgress, NoProgress, ProgressEvent};
pub use stats::BatchTally;
pub use ytdlp::YtDlpEngine;
