//! Argument vector for the external downloader and the pre-flight check.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::{Quality, ToolConfig};

use super::error::ToolUnavailable;

const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// How the downloader program is launched (never through a shell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderCommand {
    pub program: String,
    pub prefix_args: Vec<String>,
}

impl Default for DownloaderCommand {
    fn default() -> Self {
        Self::from(&ToolConfig::default())
    }
}

impl From<&ToolConfig> for DownloaderCommand {
    fn from(cfg: &ToolConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            prefix_args: cfg.prefix_args.clone(),
        }
    }
}

/// Per-batch download settings shared by every job.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Output path template handed to the downloader (`-o`).
    pub output_template: String,
    pub quality: Quality,
    /// Extract audio to mp3 instead of keeping the video.
    pub audio_only: bool,
}

impl JobOptions {
    /// Options writing `<title>.<ext>` files into `output_dir`.
    pub fn in_dir(output_dir: &Path, quality: Quality, audio_only: bool) -> Self {
        Self {
            output_template: output_dir.join("%(title)s.%(ext)s").display().to_string(),
            quality,
            audio_only,
        }
    }

    /// Downloader arguments for one URL; the URL is always last.
    pub fn args(&self, url: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--newline".into(),
            "-o".into(),
            self.output_template.clone(),
            "--no-warnings".into(),
        ];
        if let Some(height) = self.quality.height() {
            args.push("-S".into());
            args.push(format!("res:{height},ext:mp4:m4a"));
        }
        if self.audio_only {
            args.extend(["-x", "--audio-format", "mp3"].map(String::from));
        }
        args.extend(
            [
                "--add-metadata",
                "--no-overwrites",
                "--continue",
                "--restrict-filenames",
            ]
            .map(String::from),
        );
        args.push(url.to_string());
        args
    }
}

impl DownloaderCommand {
    /// Process for one job: stdout and stderr piped, stdin closed.
    ///
    /// The child is not killed when its handle is dropped; an interrupted run
    /// leaves in-flight downloads to finish on their own.
    pub fn job(&self, opts: &JobOptions, url: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix_args)
            .args(opts.args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false);
        cmd
    }

    /// Run `<program> <prefix_args> --version` once before any job starts.
    pub async fn check_available(&self) -> Result<(), ToolUnavailable> {
        let unavailable = |reason: String| ToolUnavailable {
            program: self.program.clone(),
            reason,
        };
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.prefix_args)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        let status = tokio::time::timeout(VERSION_CHECK_TIMEOUT, cmd.status())
            .await
            .map_err(|_| unavailable(format!("no answer within {}s", VERSION_CHECK_TIMEOUT.as_secs())))?
            .map_err(|e| unavailable(e.to_string()))?;
        if !status.success() {
            return Err(unavailable(format!("--version exited with {status}")));
        }
        tracing::debug!(program = %self.program, "downloader available");
        Ok(())
    }
}
