//! Logging init (file in the output directory, or stderr fallback) and the
//! per-job log handle that job runners append raw downloader output to.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_FILE_NAME: &str = "download.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Error-level events only, plain text, for the terminal.
fn terminal_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::ERROR)
}

/// Initialize structured logging to `<output_dir>/download.log`.
///
/// The file gets everything the env filter admits (default `info`); errors
/// are also echoed to stderr. stdout stays with the dashboard.
/// Events from concurrent workers are serialized through one `Mutex<File>`.
/// On failure returns Err so the caller can fall back to stderr.
pub fn init_logging(output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;
    let log_file_path = output_dir.join(LOG_FILE_NAME);

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("open log file {}", log_file_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_filter(env_filter());
    tracing_subscriber::registry()
        .with(file_layer)
        .with(terminal_layer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;

    tracing::info!("vdl logging initialized at {}", log_file_path.display());
    Ok(log_file_path)
}

/// Initialize logging to stderr only, warnings and up. Use when init_logging() fails.
pub fn init_logging_stderr() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

/// Append-only log handle passed to each job runner.
pub trait LogSink: Send + Sync {
    fn append(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.append(Level::INFO, message);
    }

    fn error(&self, message: &str) {
        self.append(Level::ERROR, message);
    }
}

/// Forwards job output to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "vdl::job", "{}", message),
            Level::WARN => tracing::warn!(target: "vdl::job", "{}", message),
            Level::INFO => tracing::info!(target: "vdl::job", "{}", message),
            Level::DEBUG => tracing::debug!(target: "vdl::job", "{}", message),
            Level::TRACE => tracing::trace!(target: "vdl::job", "{}", message),
        }
    }
}

/// Keeps entries in memory; used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Messages logged at `level`, in append order.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn append(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}
