//! CLI for the VDL batch video downloader.

mod commands;
mod signal;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;
use vdl_core::config::{self, Quality, RetryConfig, ToolConfig, VdlConfig};
use vdl_core::logging;

use commands::run_downloads;

const EXAMPLES: &str = "\
Examples:
  vdl --urls \"https://example.com/video1\" \"https://example.com/video2\"
  vdl --file links.txt --quality 720p --threads 3
  vdl --csv links.csv --extract-audio --output-dir ./my_downloads";

/// Top-level CLI for the VDL downloader.
#[derive(Debug, Parser)]
#[command(name = "vdl")]
#[command(about = "VDL: batch video downloader with a live progress dashboard", long_about = None)]
#[command(after_help = EXAMPLES)]
#[command(group(ArgGroup::new("source").required(true).args(["urls", "file", "csv"])))]
pub struct Cli {
    /// List of video URLs.
    #[arg(long, num_args = 1.., value_name = "URL")]
    pub urls: Vec<String>,

    /// Text file with URLs (one per line, `#` starts a comment).
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// CSV file with URLs in the first column.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Output directory [config default: ./downloads].
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Video quality: best, 720p, 480p or 360p [config default: best].
    #[arg(short = 'q', long)]
    pub quality: Option<Quality>,

    /// Extract audio only (MP3).
    #[arg(short = 'x', long)]
    pub extract_audio: bool,

    /// Simultaneous downloads [config default: 1].
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Retry attempts for failed downloads [config default: 2].
    #[arg(short = 'r', long, value_name = "N")]
    pub retries: Option<u32>,

    /// Do not draw the live dashboard (logs and the final line only).
    #[arg(long)]
    pub no_dashboard: bool,
}

/// Where the URLs come from; exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    Args(Vec<String>),
    TextFile(PathBuf),
    CsvFile(PathBuf),
}

impl Cli {
    pub fn source(&self) -> UrlSource {
        if let Some(path) = &self.file {
            UrlSource::TextFile(path.clone())
        } else if let Some(path) = &self.csv {
            UrlSource::CsvFile(path.clone())
        } else {
            UrlSource::Args(self.urls.clone())
        }
    }
}

/// Config file values with command-line overrides applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub quality: Quality,
    pub audio_only: bool,
    pub threads: usize,
    pub retries: u32,
    pub refresh_interval: Duration,
    pub tool: ToolConfig,
    pub retry: RetryConfig,
    pub dashboard: bool,
}

impl Settings {
    pub fn merge(cli: &Cli, cfg: &VdlConfig) -> Self {
        Self {
            output_dir: cli.output_dir.clone().unwrap_or_else(|| cfg.output_dir.clone()),
            quality: cli.quality.unwrap_or(cfg.quality),
            audio_only: cli.extract_audio,
            threads: cli.threads.unwrap_or(cfg.threads).max(1),
            retries: cli.retries.unwrap_or(cfg.retries),
            refresh_interval: cfg.refresh_interval(),
            tool: cfg.tool.clone().unwrap_or_default(),
            retry: cfg.retry.clone().unwrap_or_default(),
            dashboard: !cli.no_dashboard,
        }
    }
}

/// How a completed invocation ended; errors are reported separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Finished,
    Interrupted,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Finished => 0,
            RunStatus::Interrupted => 1,
        }
    }
}

pub async fn run_from_args() -> Result<RunStatus> {
    let cli = Cli::parse();
    // Logging needs the output dir, so config problems are reported after init.
    let (cfg, cfg_err) = match config::load_or_init() {
        Ok(cfg) => (cfg, None),
        Err(e) => (VdlConfig::default(), Some(e)),
    };
    let settings = Settings::merge(&cli, &cfg);

    let log_path = match logging::init_logging(&settings.output_dir) {
        Ok(path) => Some(path),
        Err(e) => {
            logging::init_logging_stderr();
            tracing::warn!("file logging unavailable, using stderr: {:#}", e);
            None
        }
    };
    if let Some(e) = cfg_err {
        tracing::warn!("config not loaded, using defaults: {:#}", e);
    }
    tracing::debug!("settings: {:?}", settings);

    run_downloads(&cli.source(), &settings, log_path.as_deref()).await
}

#[cfg(test)]
mod tests;
