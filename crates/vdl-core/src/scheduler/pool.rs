//! Bounded worker pool.
//!
//! Keeps up to `max_concurrent` jobs running at once; when one finishes, the
//! next queued task is started until the queue is empty. Outcomes are
//! reported in completion order.

use std::future::Future;

use crate::control::RunControl;
use crate::progress::Task;
use crate::runner::{TaskError, TaskOutcome};

/// Run every task through `run`, at most `max_concurrent` at a time.
///
/// Each task is submitted exactly once. A panic inside one job becomes a
/// failed outcome for that task and does not disturb its siblings. Once
/// `control` is interrupted no further task is started; jobs already running
/// are awaited.
pub async fn run_pool<F, Fut, D>(
    tasks: Vec<Task>,
    max_concurrent: usize,
    control: &RunControl,
    run: F,
    mut on_done: D,
) -> Vec<TaskOutcome>
where
    F: Fn(Task) -> Fut,
    Fut: Future<Output = TaskOutcome> + Send + 'static,
    D: FnMut(&TaskOutcome),
{
    let max_concurrent = max_concurrent.max(1);
    let mut queue = tasks.into_iter();
    let mut outcomes = Vec::with_capacity(queue.len());
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent && !control.is_interrupted() {
            let Some(task) = queue.next() else {
                break;
            };
            let job = run(task.clone());
            join_set.spawn(async move {
                // Inner spawn isolates panics so the task identity survives.
                match tokio::spawn(job).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(url = %task.url, "job aborted: {}", e);
                        TaskOutcome {
                            error: Some(TaskError::Panicked {
                                url: task.url.clone(),
                            }),
                            task,
                            attempt: 0,
                        }
                    }
                }
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok(outcome) => {
                on_done(&outcome);
                outcomes.push(outcome);
            }
            Err(e) => tracing::error!("pool task join: {}", e),
        }
    }

    if control.is_interrupted() && queue.len() > 0 {
        tracing::warn!(skipped = queue.len(), "interrupted; tasks left undispatched");
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn tasks(n: usize) -> Vec<Task> {
        let urls: Vec<String> = (1..=n).map(|i| format!("https://e.x/{i}")).collect();
        Task::batch(&urls)
    }

    fn ok(task: Task) -> TaskOutcome {
        TaskOutcome {
            task,
            attempt: 1,
            error: None,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_max_concurrent() {
        let live = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let control = RunControl::new();
        let outcomes = run_pool(
            tasks(10),
            3,
            &control,
            |task| {
                let live = Arc::clone(&live);
                let peak = Arc::clone(&peak);
                async move {
                    let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    live.fetch_sub(1, Ordering::SeqCst);
                    ok(task)
                }
            },
            |_| {},
        )
        .await;
        assert_eq!(outcomes.len(), 10);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn results_arrive_in_completion_order() {
        let control = RunControl::new();
        let mut seen = Vec::new();
        let outcomes = run_pool(
            tasks(3),
            3,
            &control,
            |task| async move {
                // Later tasks finish first.
                let wait = 60 - 20 * task.index as u64;
                tokio::time::sleep(Duration::from_millis(wait)).await;
                ok(task)
            },
            |o| seen.push(o.task.index),
        )
        .await;
        assert_eq!(seen, vec![3, 2, 1]);
        let order: Vec<usize> = outcomes.iter().map(|o| o.task.index).collect();
        assert_eq!(order, seen);
    }

    #[tokio::test]
    async fn panicking_job_does_not_sink_siblings() {
        let control = RunControl::new();
        let outcomes = run_pool(
            tasks(4),
            2,
            &control,
            |task| async move {
                if task.index == 2 {
                    panic!("job blew up");
                }
                ok(task)
            },
            |_| {},
        )
        .await;
        assert_eq!(outcomes.len(), 4);
        let failed: Vec<_> = outcomes.iter().filter(|o| !o.success()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].task.index, 2);
        assert!(matches!(failed[0].error, Some(TaskError::Panicked { .. })));
    }

    #[tokio::test]
    async fn interrupt_stops_dispatch() {
        let control = Arc::new(RunControl::new());
        let started = Arc::new(AtomicUsize::new(0));
        let outcomes = run_pool(
            tasks(5),
            1,
            &control,
            |task| {
                let control = Arc::clone(&control);
                let started = Arc::clone(&started);
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    control.interrupt();
                    ok(task)
                }
            },
            |_| {},
        )
        .await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(outcomes.len(), 1);
    }

    #[tokio::test]
    async fn zero_threads_is_treated_as_one() {
        let control = RunControl::new();
        let outcomes = run_pool(tasks(2), 0, &control, |task| async move { ok(task) }, |_| {}).await;
        assert_eq!(outcomes.len(), 2);
    }
}
