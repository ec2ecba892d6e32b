//! CLI mode for vidl: argument dispatch and console output.

mod progress;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{
    AppConfig, DownloadProgress, Downloader, Engine, FileSystem, JobRequest, MediaMode,
    run_batch,
};

pub use progress::{ConsoleProgress, format_status};

/// Flag selecting batch mode; must be the first argument.
pub const BATCH_FLAG: &str = "--batch";
/// Flag selecting audio-only mode; may appear anywhere.
pub const AUDIO_FLAG: &str = "--audio";

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Download a single URL.
    Download {
        url: String,
        mode: MediaMode,
    },
    /// Download every URL listed in a file.
    Batch(PathBuf),
    /// Print usage and exit successfully.
    Help,
}

/// Malformed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("No URL given")]
    MissingUrl,
    #[error("Error: Please provide a file with URLs")]
    MissingBatchFile,
}

/// Parses the arguments following the program name.
///
/// Only presence is checked; unrecognized extra arguments are ignored.
///
/// # Errors
///
/// Returns a [`UsageError`] when no argument is given or `--batch` lacks a file.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Command, UsageError> {
    let first: &str = args.first().map(|a| a.as_ref()).ok_or(UsageError::MissingUrl)?;

    if first == BATCH_FLAG {
        return args
            .get(1)
            .map(|file| Command::Batch(PathBuf::from(file.as_ref())))
            .ok_or(UsageError::MissingBatchFile);
    }

    if first == "-h" || first == "--help" {
        return Ok(Command::Help);
    }

    let mode = if args.iter().any(|a| a.as_ref() == AUDIO_FLAG) {
        MediaMode::Audio
    } else {
        MediaMode::Video
    };

    Ok(Command::Download {
        url: first.to_string(),
        mode,
    })
}

fn print_usage() {
    println!("Video Downloader");
    println!();
    println!("Usage:");
    println!("  Single video:  vidl <URL>");
    println!("  Audio only:    vidl <URL> --audio");
    println!("  Batch mode:    vidl --batch <file.txt>");
    println!();
    println!("Examples:");
    println!("  vidl https://youtube.com/watch?v=example");
    println!("  vidl https://vimeo.com/123456 --audio");
    println!("  vidl --batch urls.txt");
    println!();
    println!("Environment:");
    println!("  VIDL_YTDLP        yt-dlp binary (default: yt-dlp)");
    println!("  VIDL_OUTPUT_DIR   output directory (default: downloads)");
    println!("  RUST_LOG          log filter (default: warn)");
}

/// Executes a parsed command. Returns whether everything succeeded.
///
/// # Errors
///
/// Returns an error only for failures outside any single job, such as an
/// unreadable batch file. A missing batch file is reported and yields `Ok(false)`.
pub async fn execute<E: Engine, F: FileSystem>(
    command: Command,
    downloader: &Downloader<E, F>,
    output_dir: &Path,
    progress: &dyn DownloadProgress,
) -> crate::Result<bool> {
    match command {
        Command::Help => {
            print_usage();
            Ok(true)
        }
        Command::Download { url, mode } => {
            let request = JobRequest::new(url, output_dir, mode);
            let result = downloader.download(request, progress).await;
            Ok(result.succeeded())
        }
        Command::Batch(path) => match run_batch(downloader, &path, output_dir, progress).await {
            Ok(tally) => Ok(tally.all_succeeded()),
            Err(crate::Error::BatchFileNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        },
    }
}

/// Runs the CLI with the arguments following the program name.
///
/// Returns whether the process should exit successfully.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the batch file
/// cannot be read. [`exit_code`] prints it for the user.
pub async fn run<S: AsRef<str>>(args: &[S]) -> crate::Result<bool> {
    let command = match parse_args(args) {
        Ok(command) => command,
        Err(e) => {
            if e == UsageError::MissingBatchFile {
                println!("{e}");
            }
            print_usage();
            return Ok(false);
        }
    };
    if command == Command::Help {
        print_usage();
        return Ok(true);
    }

    let config = AppConfig::load()?;
    log::debug!("Using config {config:?}");

    let downloader = Downloader::new(config.download.clone());
    let progress = ConsoleProgress::new();
    execute(command, &downloader, &config.paths.output_dir, &progress).await
}

/// Maps the outcome of [`run`] to a process exit code, printing any error.
#[must_use]
pub fn exit_code(outcome: &crate::Result<bool>) -> i32 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}
