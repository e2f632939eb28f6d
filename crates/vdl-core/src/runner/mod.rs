//! Job runner: drive one external download process end to end.
//!
//! Spawns the downloader, merges its stdout and stderr into one line stream,
//! forwards each line to the log and the line parser, and settles the task's
//! progress record as `Completed` or `Failed` before returning. Every error is
//! scoped to the task; nothing escapes into the worker pool.

mod command;
mod error;
mod stream;

use std::sync::Arc;

use crate::logging::LogSink;
use crate::parser::parse_line;
use crate::progress::{ProgressRecord, Task};

pub use command::{DownloaderCommand, JobOptions};
pub use error::{TaskError, ToolUnavailable};

use self::stream::{next_from, LineStream};

/// Everything a job needs besides its task and record; shared by all jobs of a batch.
#[derive(Clone)]
pub struct JobContext {
    pub command: DownloaderCommand,
    pub options: JobOptions,
    pub log: Arc<dyn LogSink>,
}

/// Terminal result of one attempt.
#[derive(Debug)]
pub struct TaskOutcome {
    pub task: Task,
    /// 1-based attempt number.
    pub attempt: u32,
    pub error: Option<TaskError>,
}

impl TaskOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn message(&self) -> String {
        match &self.error {
            None => "Download completed".to_string(),
            Some(e) => e.to_string(),
        }
    }
}

/// Run one attempt of `task`. Exactly one attempt; retries belong to the caller.
pub async fn run_job(
    ctx: &JobContext,
    task: &Task,
    record: &ProgressRecord,
    attempt: u32,
) -> TaskOutcome {
    let url = task.url.as_str();
    tracing::debug!(url, index = task.index, attempt, "job started");
    let result = drive(ctx, url, record).await;
    match &result {
        Ok(()) => {
            // Covers runs that never print a 100% line (file already present).
            record.mark_completed();
            ctx.log.info(&format!("SUCCESS: {url}"));
        }
        Err(e) => {
            let message = e.to_string();
            record.mark_failed(message.clone());
            ctx.log.error(&message);
        }
    }
    TaskOutcome {
        task: task.clone(),
        attempt,
        error: result.err(),
    }
}

async fn drive(ctx: &JobContext, url: &str, record: &ProgressRecord) -> Result<(), TaskError> {
    let mut child = ctx
        .command
        .job(&ctx.options, url)
        .spawn()
        .map_err(|source| TaskError::Launch {
            url: url.to_string(),
            source,
        })?;
    let stream_err = |source| TaskError::Stream {
        url: url.to_string(),
        source,
    };

    let mut out = child.stdout.take().map(LineStream::new);
    let mut err = child.stderr.take().map(LineStream::new);

    while out.is_some() || err.is_some() {
        let (line, from_stdout) = tokio::select! {
            line = next_from(&mut out), if out.is_some() => (line, true),
            line = next_from(&mut err), if err.is_some() => (line, false),
        };
        match line.map_err(stream_err)? {
            Some(line) => handle_line(ctx.log.as_ref(), record, &line),
            None if from_stdout => out = None,
            None => err = None,
        }
    }

    let status = child.wait().await.map_err(stream_err)?;
    if status.success() {
        Ok(())
    } else {
        Err(TaskError::Exit {
            url: url.to_string(),
            code: status.code(),
        })
    }
}

fn handle_line(log: &dyn LogSink, record: &ProgressRecord, line: &str) {
    log.info(line);
    record.apply(&parse_line(line));
}
