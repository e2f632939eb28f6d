//! Live status of one download attempt.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::parser::LineUpdate;

pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_SPEED: &str = "0B/s";
pub const DEFAULT_ETA: &str = "00:00";
pub const DEFAULT_DOWNLOADED: &str = "0B";

/// Lifecycle of a download attempt. Leaves `Running` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Completed,
    Failed,
}

/// Point-in-time copy of a record, safe to format without holding the lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub percentage: f64,
    pub speed: String,
    pub eta: String,
    pub size: String,
    pub downloaded: String,
    pub filename: String,
    pub state: TaskState,
    pub error: Option<String>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            percentage: 0.0,
            speed: DEFAULT_SPEED.to_string(),
            eta: DEFAULT_ETA.to_string(),
            size: UNKNOWN.to_string(),
            downloaded: DEFAULT_DOWNLOADED.to_string(),
            filename: UNKNOWN.to_string(),
            state: TaskState::Running,
            error: None,
        }
    }
}

/// Progress of one attempt: written by its job runner, read by the dashboard.
///
/// One lock per record; readers get a copy and never block each other.
/// Once the state is terminal every writer method is a no-op.
#[derive(Debug, Default)]
pub struct ProgressRecord {
    inner: RwLock<ProgressSnapshot>,
}

impl ProgressRecord {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking writer cannot leave a field half-written, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, ProgressSnapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProgressSnapshot> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// A record that starts out `Failed` with `message`.
    pub fn failed(message: impl Into<String>) -> Self {
        let record = Self::new();
        record.mark_failed(message);
        record
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.read().clone()
    }

    pub fn state(&self) -> TaskState {
        self.read().state
    }

    /// Merge the fields present in `update`; absent fields keep their value.
    pub fn apply(&self, update: &LineUpdate) {
        if update.is_empty() {
            return;
        }
        let mut s = self.write();
        if s.state != TaskState::Running {
            return;
        }
        if let Some(p) = update.percentage {
            s.percentage = p;
        }
        if let Some(v) = &update.speed {
            s.speed = v.clone();
        }
        if let Some(v) = &update.eta {
            s.eta = v.clone();
        }
        if let Some(v) = &update.size {
            s.size = v.clone();
        }
        if let Some(v) = &update.downloaded {
            s.downloaded = v.clone();
        }
        if let Some(v) = &update.filename {
            s.filename = v.clone();
        }
        if update.completed {
            s.percentage = 100.0;
            s.downloaded = s.size.clone();
        }
    }

    /// Transition to `Completed`. Returns false if the record was already terminal.
    pub fn mark_completed(&self) -> bool {
        let mut s = self.write();
        if s.state != TaskState::Running {
            return false;
        }
        s.state = TaskState::Completed;
        s.percentage = 100.0;
        s.downloaded = s.size.clone();
        true
    }

    /// Transition to `Failed`. Returns false if the record was already terminal.
    pub fn mark_failed(&self, message: impl Into<String>) -> bool {
        let mut s = self.write();
        if s.state != TaskState::Running {
            return false;
        }
        s.state = TaskState::Failed;
        s.error = Some(message.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    #[test]
    fn defaults_are_sentinels() {
        let s = ProgressRecord::new().snapshot();
        assert_eq!(s.state, TaskState::Running);
        assert_eq!(s.filename, UNKNOWN);
        assert_eq!(s.size, UNKNOWN);
        assert_eq!(s.speed, DEFAULT_SPEED);
        assert_eq!(s.percentage, 0.0);
        assert!(s.error.is_none());
    }

    #[test]
    fn partial_updates_merge() {
        let rec = ProgressRecord::new();
        rec.apply(&parse_line("[download] Destination: out/a.mp4"));
        rec.apply(&parse_line("[download]   3.00MiB at 1.00MiB/s"));
        rec.apply(&parse_line("[download]  45.2% of 120.00MiB at 3.50MiB/s ETA 00:30"));
        let s = rec.snapshot();
        assert_eq!(s.filename, "out/a.mp4");
        assert_eq!(s.downloaded, "3.00MiB");
        assert_eq!(s.percentage, 45.2);
        assert_eq!(s.size, "120.00MiB");
        assert_eq!(s.speed, "3.50MiB/s");
        assert_eq!(s.eta, "00:30");
        assert_eq!(s.state, TaskState::Running);
    }

    #[test]
    fn completion_marker_forces_percentage_but_keeps_running() {
        let rec = ProgressRecord::new();
        rec.apply(&parse_line("[download] 100% of 10.00MiB in 00:01"));
        let s = rec.snapshot();
        assert_eq!(s.percentage, 100.0);
        assert_eq!(s.downloaded, "10.00MiB");
        assert_eq!(s.state, TaskState::Running);
    }

    #[test]
    fn completed_implies_full_download() {
        let rec = ProgressRecord::new();
        rec.apply(&parse_line("[download]  12.0% of 8.00MiB at 1.00MiB/s ETA 00:07"));
        assert!(rec.mark_completed());
        let s = rec.snapshot();
        assert_eq!(s.state, TaskState::Completed);
        assert_eq!(s.percentage, 100.0);
        assert_eq!(s.downloaded, s.size);
    }

    #[test]
    fn terminal_state_never_reverts() {
        let rec = ProgressRecord::new();
        assert!(rec.mark_failed("boom"));
        assert!(!rec.mark_completed());
        assert!(!rec.mark_failed("again"));
        rec.apply(&parse_line("[download]  50.0% of 1.00MiB"));
        let s = rec.snapshot();
        assert_eq!(s.state, TaskState::Failed);
        assert_eq!(s.error.as_deref(), Some("boom"));
        assert_eq!(s.percentage, 0.0);
    }
}
