//! Task scheduling.
//!
//! Runs a batch of URLs through a bounded pool of job runners, in passes:
//! the first pass covers every task, later passes only the tasks the retry
//! policy sends back.

mod batch;
mod pool;

pub use batch::{run_batch, BatchOptions, BatchOutcome, RunResult, TaskResult};
pub use pool::run_pool;
