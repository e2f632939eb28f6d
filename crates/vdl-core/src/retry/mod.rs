//! Retry and backoff policy for failed tasks.
//!
//! The job runner makes exactly one attempt. Retries are passes of the worker
//! pool over the tasks that failed in the previous pass; this module decides
//! which failures qualify and how long to wait before the next pass.

mod classify;
mod policy;

pub use classify::classify;
pub use policy::{FailureKind, RetryDecision, RetryPolicy};
