//! Orchestrate one batch: board, dashboard, worker pool passes, result.

use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::control::RunControl;
use crate::dashboard::{run_dashboard, DashboardOutput};
use crate::logging::LogSink;
use crate::progress::{ProgressBoard, Task};
use crate::retry::{classify, RetryDecision, RetryPolicy};
use crate::runner::{run_job, JobContext, TaskError, TaskOutcome};

use super::pool::run_pool;

/// How long an interrupted run waits for the dashboard's last frame.
const DASHBOARD_GRACE: Duration = Duration::from_secs(1);

/// Plain configuration record for a batch, already merged from config file and flags.
#[derive(Clone)]
pub struct BatchOptions {
    pub threads: usize,
    pub retry: RetryPolicy,
    pub refresh_interval: Duration,
    pub output: DashboardOutput,
    pub job: JobContext,
}

/// Final outcome of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub url: String,
    pub success: bool,
    pub message: String,
}

impl From<&TaskOutcome> for TaskResult {
    fn from(o: &TaskOutcome) -> Self {
        Self {
            url: o.task.url.clone(),
            success: o.success(),
            message: o.message(),
        }
    }
}

/// One entry per task, in batch order, from each task's last attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub entries: Vec<TaskResult>,
}

impl RunResult {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn successful(&self) -> usize {
        self.entries.iter().filter(|e| e.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Download completed. Successful: {}, Failed: {}, Total: {}",
            self.successful(),
            self.failed(),
            self.total()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Finished(RunResult),
    /// Operator interrupt; in-flight downloads were left running.
    Interrupted,
}

/// Run every URL through the worker pool, retrying failed tasks in later
/// passes as the retry policy allows, while the dashboard redraws.
pub async fn run_batch(
    urls: &[String],
    opts: BatchOptions,
    control: Arc<RunControl>,
) -> Result<BatchOutcome> {
    let tasks = Task::batch(urls);
    let board = Arc::new(ProgressBoard::new(&tasks));
    let log = Arc::clone(&opts.job.log);
    log.info(&format!("Found {} URLs", tasks.len()));

    let dashboard = tokio::spawn(run_dashboard(
        Arc::clone(&board),
        Arc::clone(&control),
        opts.refresh_interval,
        opts.output.writer(),
    ));

    let mut last: Vec<Option<TaskResult>> = vec![None; tasks.len()];
    let mut pending = tasks;
    let mut attempt = 1u32;

    loop {
        let pass = run_pass(pending, attempt, &opts, &board, &control);
        let outcomes = tokio::select! {
            outcomes = pass => outcomes,
            _ = control.interrupted() => return interrupted(dashboard, log.as_ref()).await,
        };

        let mut retry = Vec::new();
        let mut delay = Duration::ZERO;
        for outcome in &outcomes {
            last[outcome.task.index - 1] = Some(TaskResult::from(outcome));
            if let Some(err) = &outcome.error {
                if let RetryDecision::RetryAfter(d) = opts.retry.decide(attempt, classify(err)) {
                    delay = delay.max(d);
                    retry.push(outcome.task.clone());
                }
            }
        }

        if control.is_interrupted() {
            return interrupted(dashboard, log.as_ref()).await;
        }
        if retry.is_empty() {
            break;
        }

        retry.sort_by_key(|t| t.index);
        attempt += 1;
        log.info(&format!(
            "Retrying {} failed download(s) in {:.1}s (attempt {} of {})",
            retry.len(),
            delay.as_secs_f64(),
            attempt,
            opts.retry.max_attempts
        ));
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = control.interrupted() => return interrupted(dashboard, log.as_ref()).await,
        }
        for task in &retry {
            if let Some(slot) = board.slot(task.index) {
                slot.restart();
            }
        }
        pending = retry;
    }

    control.stop_dashboard();
    dashboard.await.context("dashboard join")?;

    let result = RunResult {
        entries: last
            .into_iter()
            .zip(urls)
            .map(|(entry, url)| {
                entry.unwrap_or_else(|| TaskResult {
                    url: url.clone(),
                    success: false,
                    message: format!("FAILED: {url} - job did not report a result"),
                })
            })
            .collect(),
    };

    let summary = result.summary_line();
    log.info(&summary);
    let mut out = opts.output.writer();
    writeln!(out, "\n{summary}").context("write summary")?;
    Ok(BatchOutcome::Finished(result))
}

async fn run_pass(
    tasks: Vec<Task>,
    attempt: u32,
    opts: &BatchOptions,
    board: &Arc<ProgressBoard>,
    control: &RunControl,
) -> Vec<TaskOutcome> {
    let run = |task: Task| {
        let ctx = opts.job.clone();
        let board = Arc::clone(board);
        async move {
            let record = match board.slot(task.index) {
                Some(slot) => slot.record(),
                None => Arc::default(),
            };
            run_job(&ctx, &task, &record, attempt).await
        }
    };
    run_pool(tasks, opts.threads, control, run, |outcome| {
        // A panicking job never settled its record; keep the board in line with the result.
        if let Some(err @ TaskError::Panicked { .. }) = &outcome.error {
            if let Some(slot) = board.slot(outcome.task.index) {
                slot.force_failed(&err.to_string());
            }
        }
        tracing::debug!(
            url = %outcome.task.url,
            attempt = outcome.attempt,
            success = outcome.success(),
            "task finished"
        );
    })
    .await
}

async fn interrupted(
    dashboard: tokio::task::JoinHandle<()>,
    log: &dyn LogSink,
) -> Result<BatchOutcome> {
    log.error("Download interrupted by user");
    if tokio::time::timeout(DASHBOARD_GRACE, dashboard).await.is_err() {
        tracing::debug!("dashboard did not finish within grace period");
    }
    Ok(BatchOutcome::Interrupted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, success: bool) -> TaskResult {
        TaskResult {
            url: url.into(),
            success,
            message: String::new(),
        }
    }

    #[test]
    fn run_result_counts() {
        let r = RunResult {
            entries: vec![entry("a", true), entry("b", false), entry("c", true)],
        };
        assert_eq!(r.total(), 3);
        assert_eq!(r.successful(), 2);
        assert_eq!(r.failed(), 1);
        assert_eq!(
            r.summary_line(),
            "Download completed. Successful: 2, Failed: 1, Total: 3"
        );
    }
}
