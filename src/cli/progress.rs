//! Console rendering of download progress.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::{BatchTally, DownloadProgress, Error, JobRequest, MediaMode, ProgressEvent};

/// Formats the in-place status line. Missing fields render as `N/A`.
#[must_use]
pub fn format_status(percent: Option<&str>, speed: Option<&str>, eta: Option<&str>) -> String {
    format!(
        "Progress: {} | Speed: {} | ETA: {}",
        percent.unwrap_or("N/A"),
        speed.unwrap_or("N/A"),
        eta.unwrap_or("N/A"),
    )
}

/// Creates the single-line bar that gets overwritten on every status event.
fn make_status_line() -> ProgressBar {
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
    bar.set_style(ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
    bar
}

/// Where the status line is drawn.
enum StatusLine {
    /// Interactive terminal: an indicatif bar redrawn in place.
    Bar(Option<ProgressBar>),
    /// Pipe or file: `\r`-prefixed writes, since indicatif draws nothing there.
    Plain {
        out: Box<dyn Write + Send>,
        active: bool,
    },
}

/// Progress sink that writes human-readable output to the terminal.
pub struct ConsoleProgress {
    line: Mutex<StatusLine>,
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProgress {
    /// Draws with indicatif when stdout is a terminal, plain text otherwise.
    #[must_use]
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self {
                line: Mutex::new(StatusLine::Bar(None)),
            }
        } else {
            Self::with_writer(io::stdout())
        }
    }

    /// Writes everything, status line included, as plain text to `out`.
    #[must_use]
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            line: Mutex::new(StatusLine::Plain {
                out: Box::new(out),
                active: false,
            }),
        }
    }

    fn show_status(&self, msg: String) {
        let Ok(mut line) = self.line.lock() else {
            return;
        };
        match &mut *line {
            StatusLine::Bar(bar) => bar.get_or_insert_with(make_status_line).set_message(msg),
            StatusLine::Plain { out, active } => {
                let _ = write!(out, "\r{msg}");
                let _ = out.flush();
                *active = true;
            }
        }
    }

    /// Ends the active status line, if any, keeping its last text visible.
    fn end_status(&self, abandon: bool) {
        let Ok(mut line) = self.line.lock() else {
            return;
        };
        match &mut *line {
            StatusLine::Bar(bar) => {
                if let Some(bar) = bar.take() {
                    if abandon {
                        bar.abandon();
                    } else {
                        bar.finish();
                    }
                }
            }
            StatusLine::Plain { out, active } => {
                if std::mem::take(active) {
                    let _ = writeln!(out);
                }
            }
        }
    }

    fn say(&self, text: &str) {
        let Ok(mut line) = self.line.lock() else {
            return;
        };
        match &mut *line {
            StatusLine::Bar(_) => println!("{text}"),
            StatusLine::Plain { out, .. } => {
                let _ = writeln!(out, "{text}");
                let _ = out.flush();
            }
        }
    }
}

impl DownloadProgress for ConsoleProgress {
    fn on_job_start(&self, request: &JobRequest) {
        match request.mode() {
            MediaMode::Video => self.say(&format!("Downloading from: {}", request.url())),
            MediaMode::Audio => self.say(&format!("Downloading audio from: {}", request.url())),
        }
    }

    fn on_status(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Downloading {
                percent,
                speed,
                eta,
            } => {
                self.show_status(format_status(
                    percent.as_deref(),
                    speed.as_deref(),
                    eta.as_deref(),
                ));
            }
            ProgressEvent::Finished => {
                self.end_status(false);
                self.say("Download complete, processing...");
            }
        }
    }

    fn on_job_complete(&self, _request: &JobRequest, title: &str) {
        self.end_status(false);
        self.say(&format!("{} Downloaded: {title}", style("✓").green()));
    }

    fn on_job_error(&self, _request: &JobRequest, error: &Error) {
        self.end_status(true);
        self.say(&format!("{} Error downloading: {error}", style("✗").red()));
    }

    fn on_batch_start(&self, total: usize) {
        self.say(&format!("Found {total} URLs to download\n"));
    }

    fn on_batch_item(&self, index: usize, total: usize) {
        self.say(&format!("\n[{index}/{total}]"));
    }

    fn on_batch_complete(&self, tally: &BatchTally) {
        self.say(&format!("\n\nCompleted: {tally} successful downloads"));
    }

    fn on_batch_file_missing(&self, path: &Path) {
        self.say(&format!("Error: File '{}' not found", path.display()));
    }
}
