//! Per-task and pre-flight error types.

use std::io;
use thiserror::Error;

/// Failure of one task attempt. Scoped to that task; siblings are unaffected.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The downloader process could not be started.
    #[error("Exception for {url}: could not start downloader: {source}")]
    Launch {
        url: String,
        #[source]
        source: io::Error,
    },
    /// Reading the output stream or waiting for exit failed.
    #[error("Exception for {url}: downloader I/O failed: {source}")]
    Stream {
        url: String,
        #[source]
        source: io::Error,
    },
    /// The downloader exited with a nonzero status (`None` = killed by a signal).
    #[error("FAILED: {url} - {}", exit_text(.code))]
    Exit { url: String, code: Option<i32> },
    /// The job panicked inside the worker pool.
    #[error("FAILED: {url} - job panicked")]
    Panicked { url: String },
}

fn exit_text(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("downloader returned code {c}"),
        None => "downloader terminated by signal".to_string(),
    }
}

/// The downloader cannot be invoked at all; checked once before any task runs.
#[derive(Debug, Error)]
#[error("downloader '{program}' is not available: {reason}")]
pub struct ToolUnavailable {
    pub program: String,
    pub reason: String,
}
