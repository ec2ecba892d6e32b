//! [`Engine`] implementation backed by the `yt-dlp` executable.
//!
//! `yt-dlp` is run as a child process. A custom progress template and a
//! post-move `--print` give it a line-oriented, prefix-tagged output that is
//! parsed back into [`ProgressEvent`]s and a [`MediaInfo`].

use std::collections::VecDeque;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::config::DownloadConfig;
use crate::engine::{Engine, EngineOptions, PostProcessor};
use crate::error::{Error, Result};
use crate::job::MediaInfo;
use crate::progress::{DownloadProgress, ProgressEvent};

const PROGRESS_TAG: &str = "vidl-progress";
const INFO_TAG: &str = "vidl-info";
const PROGRESS_TEMPLATE: &str = "download:vidl-progress|%(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s";
const INFO_TEMPLATE: &str = "after_move:vidl-info|%(.{title,id,filepath})j";

/// Number of trailing stderr lines kept for diagnostics.
const STDERR_TAIL: usize = 200;

/// Drives the `yt-dlp` command-line program.
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    binary: String,
    leading_args: Vec<String>,
}

impl YtDlpEngine {
    /// Creates an engine that runs `binary`.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            leading_args: Vec::new(),
        }
    }

    /// Creates an engine from the download configuration.
    #[must_use]
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(config.ytdlp_path.clone())
    }

    /// Arguments placed before the generated ones, e.g. `["-m", "yt_dlp"]`
    /// when `binary` is a Python interpreter.
    #[must_use]
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::from_config(&DownloadConfig::default())
    }
}

/// Renders engine options into `yt-dlp` arguments, URL last.
#[must_use]
pub fn build_args(url: &str, options: &EngineOptions) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--format".into(),
        options.format.clone(),
        "--output".into(),
        options.output_template.clone(),
    ];

    if let Some(container) = &options.merge_output_format {
        args.push("--merge-output-format".into());
        args.push(container.clone());
    }

    for pp in &options.postprocessors {
        match pp {
            PostProcessor::ExtractAudio {
                codec,
                quality_kbps,
            } => {
                args.push("--extract-audio".into());
                args.push("--audio-format".into());
                args.push(codec.clone());
                args.push("--audio-quality".into());
                args.push(format!("{quality_kbps}K"));
            }
        }
    }

    args.extend(
        [
            "--newline",
            "--progress",
            "--no-colors",
            "--progress-template",
            PROGRESS_TEMPLATE,
            "--print",
            INFO_TEMPLATE,
            "--no-simulate",
            "--",
        ]
        .map(String::from),
    );
    args.push(url.to_string());
    args
}

/// A line of engine output that carries meaning for us.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EngineLine {
    Progress(ProgressEvent),
    Info(MediaInfo),
}

/// Engine placeholder for a missing template field.
fn field(value: &str) -> Option<String> {
    let value = value.trim();
    match value {
        "" | "NA" | "N/A" | "Unknown" => None,
        _ => Some(value.to_string()),
    }
}

fn parse_line(line: &str) -> Option<EngineLine> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (tag, rest) = line.split_once('|')?;
    match tag.trim() {
        PROGRESS_TAG => {
            let mut parts = rest.splitn(4, '|');
            let status = parts.next()?.trim();
            match status {
                "downloading" => Some(EngineLine::Progress(ProgressEvent::Downloading {
                    percent: parts.next().and_then(field),
                    speed: parts.next().and_then(field),
                    eta: parts.next().and_then(field),
                })),
                "finished" => Some(EngineLine::Progress(ProgressEvent::Finished)),
                _ => None,
            }
        }
        INFO_TAG => match serde_json::from_str(rest) {
            Ok(info) => Some(EngineLine::Info(info)),
            Err(e) => {
                log::warn!("Unparseable media info from engine: {e}");
                None
            }
        },
        _ => None,
    }
}

/// Picks the most useful diagnostic from the engine's stderr.
fn failure_message(stderr_tail: &VecDeque<String>, status: ExitStatus) -> String {
    stderr_tail
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| stderr_tail.iter().rev().find(|l| !l.trim().is_empty()))
        .cloned()
        .unwrap_or_else(|| format!("engine exited with {status}"))
}

#[derive(Default)]
struct StreamOutput {
    info: Option<MediaInfo>,
    tail: VecDeque<String>,
}

/// Reads a child stream to EOF, forwarding progress and keeping the last lines.
async fn drain<R>(stream: R, name: &str, progress: &dyn DownloadProgress) -> StreamOutput
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut out = StreamOutput::default();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed reading engine {name}: {e}");
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end();
        log::debug!("yt-dlp {name}: {line}");

        match parse_line(line) {
            Some(EngineLine::Progress(event)) => progress.on_status(&event),
            Some(EngineLine::Info(info)) => out.info = Some(info),
            None => {
                if line.starts_with("WARNING:") {
                    log::warn!("{line}");
                }
                out.tail.push_back(line.to_string());
                if out.tail.len() > STDERR_TAIL {
                    out.tail.pop_front();
                }
            }
        }
    }
    out
}

#[async_trait]
impl Engine for YtDlpEngine {
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        progress: &dyn DownloadProgress,
    ) -> Result<MediaInfo> {
        let args = build_args(url, options);
        log::debug!("Running {} {:?} {:?}", self.binary, self.leading_args, args);

        let mut child = Command::new(&self.binary)
            .args(&self.leading_args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::EngineSpawn {
                binary: self.binary.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (out, err) = tokio::join!(
            async move {
                match stdout {
                    Some(s) => drain(s, "stdout", progress).await,
                    None => StreamOutput::default(),
                }
            },
            async move {
                match stderr {
                    Some(s) => drain(s, "stderr", progress).await,
                    None => StreamOutput::default(),
                }
            },
        );

        let status = child.wait().await?;
        if !status.success() {
            let message = failure_message(&err.tail, status);
            // Reported to the user once, through the progress sink.
            log::debug!("yt-dlp failed for {url}: {message}");
            return Err(Error::Engine {
                status: status.code(),
                message,
            });
        }

        Ok(out.info.or(err.info).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobRequest;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl DownloadProgress for RecordingProgress {
        fn on_status(&self, event: &ProgressEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn video_options() -> EngineOptions {
        EngineOptions::for_request(
            &JobRequest::video("https://example.com/v", "downloads"),
            &DownloadConfig::default(),
        )
    }

    fn audio_options() -> EngineOptions {
        EngineOptions::for_request(
            &JobRequest::audio("https://example.com/a", "downloads"),
            &DownloadConfig::default(),
        )
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn video_args_select_merged_format() {
        let args = build_args("https://example.com/v", &video_options());
        assert_eq!(value_after(&args, "--format"), Some("bestvideo+bestaudio/best"));
        assert_eq!(value_after(&args, "--merge-output-format"), Some("mp4"));
        assert!(!args.iter().any(|a| a == "--extract-audio"));
        assert_eq!(args.last().map(String::as_str), Some("https://example.com/v"));
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn audio_args_extract_and_transcode() {
        let args = build_args("https://example.com/a", &audio_options());
        assert_eq!(value_after(&args, "--format"), Some("bestaudio/best"));
        assert!(args.iter().any(|a| a == "--extract-audio"));
        assert_eq!(value_after(&args, "--audio-format"), Some("mp3"));
        assert_eq!(value_after(&args, "--audio-quality"), Some("192K"));
        assert!(!args.iter().any(|a| a == "--merge-output-format"));
    }

    #[test]
    fn args_request_tagged_output() {
        let args = build_args("u", &video_options());
        assert_eq!(value_after(&args, "--progress-template"), Some(PROGRESS_TEMPLATE));
        assert_eq!(value_after(&args, "--print"), Some(INFO_TEMPLATE));
        assert!(args.iter().any(|a| a == "--newline"));
    }

    #[test]
    fn parse_downloading_line() {
        let line = "vidl-progress|downloading|  42.3%|  1.20MiB/s|00:13";
        assert_eq!(
            parse_line(line),
            Some(EngineLine::Progress(ProgressEvent::Downloading {
                percent: Some("42.3%".to_string()),
                speed: Some("1.20MiB/s".to_string()),
                eta: Some("00:13".to_string()),
            }))
        );
    }

    #[test]
    fn parse_downloading_line_with_missing_fields() {
        let line = "vidl-progress|downloading|NA|Unknown B/s|NA\r";
        assert_eq!(
            parse_line(line),
            Some(EngineLine::Progress(ProgressEvent::Downloading {
                percent: None,
                speed: Some("Unknown B/s".to_string()),
                eta: None,
            }))
        );
    }

    #[test]
    fn parse_finished_line() {
        assert_eq!(
            parse_line("vidl-progress|finished|100%|NA|NA"),
            Some(EngineLine::Progress(ProgressEvent::Finished))
        );
    }

    #[test]
    fn parse_info_line() {
        let line = r#"vidl-info|{"title": "A | B", "id": "xyz", "filepath": "downloads/A | B.mp4"}"#;
        match parse_line(line) {
            Some(EngineLine::Info(info)) => {
                assert_eq!(info.title.as_deref(), Some("A | B"));
                assert_eq!(info.id.as_deref(), Some("xyz"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        assert_eq!(parse_line("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parse_line("vidl-progress|error|NA|NA|NA"), None);
        assert_eq!(parse_line("vidl-info|not json"), None);
        assert_eq!(parse_line(""), None);
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use crate::progress::NoProgress;
        use std::os::unix::process::ExitStatusExt;
        use tempfile::TempDir;

        /// Runs a shell script in place of yt-dlp; the generated args land in `$@`.
        fn script_engine(dir: &TempDir, body: &str) -> YtDlpEngine {
            let path = dir.path().join("fake-yt-dlp.sh");
            std::fs::write(&path, body).unwrap();
            YtDlpEngine::new("sh").with_leading_args([path.to_string_lossy().into_owned()])
        }

        #[test]
        fn failure_message_prefers_error_line() {
            let tail: VecDeque<String> = [
                "ERROR: [generic] Unsupported URL: https://x",
                "some trailing noise",
            ]
            .map(String::from)
            .into();
            let status = ExitStatus::from_raw(1 << 8);
            assert_eq!(
                failure_message(&tail, status),
                "ERROR: [generic] Unsupported URL: https://x"
            );
        }

        #[test]
        fn failure_message_falls_back_to_status() {
            let status = ExitStatus::from_raw(2 << 8);
            assert!(failure_message(&VecDeque::new(), status).contains('2'));
        }

        #[tokio::test]
        async fn successful_run_reports_progress_and_info() {
            let dir = TempDir::new().unwrap();
            let engine = script_engine(
                &dir,
                concat!(
                    "echo '[generic] Extracting URL'\n",
                    "echo 'vidl-progress|downloading|  50.0%|1.00MiB/s|00:05'\n",
                    "echo 'vidl-progress|finished|100.0%|NA|NA'\n",
                    "echo 'vidl-info|{\"title\": \"Clip\", \"id\": \"c1\"}'\n",
                ),
            );
            let progress = RecordingProgress::default();

            let info = engine
                .download("https://example.com/v", &video_options(), &progress)
                .await
                .unwrap();

            assert_eq!(info.title.as_deref(), Some("Clip"));
            assert_eq!(info.id.as_deref(), Some("c1"));
            let events = progress.events.lock().unwrap();
            assert_eq!(events.len(), 2);
            assert_eq!(events[1], ProgressEvent::Finished);
        }

        #[tokio::test]
        async fn url_is_passed_last() {
            let dir = TempDir::new().unwrap();
            let engine = script_engine(
                &dir,
                "for last; do :; done\nprintf 'vidl-info|{\"title\": \"%s\"}\\n' \"$last\"\n",
            );

            let info = engine
                .download("https://example.com/last", &audio_options(), &NoProgress)
                .await
                .unwrap();
            assert_eq!(info.title.as_deref(), Some("https://example.com/last"));
        }

        #[tokio::test]
        async fn failing_run_surfaces_error_line() {
            let dir = TempDir::new().unwrap();
            let engine = script_engine(
                &dir,
                "echo 'WARNING: something odd' >&2\necho 'ERROR: Unsupported URL: nope' >&2\nexit 1\n",
            );

            let err = engine
                .download("nope", &video_options(), &NoProgress)
                .await
                .unwrap_err();
            match err {
                Error::Engine { status, message } => {
                    assert_eq!(status, Some(1));
                    assert_eq!(message, "ERROR: Unsupported URL: nope");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn success_without_info_gives_empty_media_info() {
            let dir = TempDir::new().unwrap();
            let engine = script_engine(&dir, "exit 0\n");
            let info = engine
                .download("u", &video_options(), &NoProgress)
                .await
                .unwrap();
            assert_eq!(info, MediaInfo::default());
        }

        #[tokio::test]
        async fn missing_binary_is_spawn_error() {
            let engine = YtDlpEngine::new("/nonexistent/definitely-not-yt-dlp");
            let err = engine
                .download("u", &video_options(), &NoProgress)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::EngineSpawn { .. }));
        }

        /// Keeps every log record so tests can check what reaches the user.
        struct CapturedLogs(Mutex<Vec<(log::Level, String)>>);

        impl log::Log for CapturedLogs {
            fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
                true
            }

            fn log(&self, record: &log::Record<'_>) {
                self.0
                    .lock()
                    .unwrap()
                    .push((record.level(), record.args().to_string()));
            }

            fn flush(&self) {}
        }

        static LOGS: CapturedLogs = CapturedLogs(Mutex::new(Vec::new()));

        #[tokio::test]
        async fn failing_run_is_not_logged_above_debug() {
            let _ = log::set_logger(&LOGS);
            log::set_max_level(log::LevelFilter::Trace);

            let dir = TempDir::new().unwrap();
            let engine = script_engine(
                &dir,
                "echo 'ERROR: Unsupported URL: quiet-failure' >&2\nexit 1\n",
            );
            let err = engine
                .download("quiet-failure", &video_options(), &NoProgress)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Engine { .. }));

            let logs = LOGS.0.lock().unwrap();
            let ours: Vec<_> = logs
                .iter()
                .filter(|(_, msg)| msg.contains("quiet-failure"))
                .collect();
            assert!(!ours.is_empty());
            assert!(ours.iter().all(|(level, _)| *level >= log::Level::Debug));
        }
    }
}
