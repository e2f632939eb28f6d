//! Per-task slots holding the current progress record.

use std::sync::{Arc, RwLock};

use super::record::{ProgressRecord, ProgressSnapshot, TaskState};

/// One URL of the batch with its position. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub url: String,
    /// 1-based position in the batch.
    pub index: usize,
    pub total: usize,
}

impl Task {
    /// Build the task list for a batch, indexes starting at 1.
    pub fn batch(urls: &[String]) -> Vec<Task> {
        let total = urls.len();
        urls.iter()
            .enumerate()
            .map(|(i, url)| Task {
                url: url.clone(),
                index: i + 1,
                total,
            })
            .collect()
    }
}

/// Dashboard slot: a task and the record of its latest attempt.
///
/// A retry installs a fresh record; the previous one stays frozen.
#[derive(Debug)]
pub struct TaskSlot {
    pub task: Task,
    record: RwLock<Arc<ProgressRecord>>,
}

impl TaskSlot {
    fn new(task: Task) -> Self {
        Self {
            task,
            record: RwLock::new(Arc::new(ProgressRecord::new())),
        }
    }

    pub fn record(&self) -> Arc<ProgressRecord> {
        Arc::clone(&self.record.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Replace the record with a new `Running` one and return it.
    pub fn restart(&self) -> Arc<ProgressRecord> {
        let fresh = Arc::new(ProgressRecord::new());
        *self.record.write().unwrap_or_else(|e| e.into_inner()) = Arc::clone(&fresh);
        fresh
    }

    /// Show the slot as `Failed` no matter how far its record got. A record
    /// that already completed is replaced, never rewritten.
    pub fn force_failed(&self, message: &str) {
        let mut current = self.record.write().unwrap_or_else(|e| e.into_inner());
        match current.state() {
            TaskState::Failed => {}
            TaskState::Running => {
                current.mark_failed(message);
            }
            TaskState::Completed => *current = Arc::new(ProgressRecord::failed(message)),
        }
    }
}

/// Read-only view of a slot used for rendering.
#[derive(Debug, Clone)]
pub struct SlotView {
    pub index: usize,
    pub total: usize,
    pub progress: ProgressSnapshot,
}

/// All slots of a batch, created before any task is dispatched.
#[derive(Debug)]
pub struct ProgressBoard {
    slots: Vec<TaskSlot>,
}

impl ProgressBoard {
    pub fn new(tasks: &[Task]) -> Self {
        Self {
            slots: tasks.iter().cloned().map(TaskSlot::new).collect(),
        }
    }

    /// Slot for a 1-based task index.
    pub fn slot(&self, index: usize) -> Option<&TaskSlot> {
        index.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    /// Snapshot every slot, one record at a time. Records are not read under a
    /// common lock, so the views may come from slightly different instants.
    pub fn views(&self) -> Vec<SlotView> {
        self.slots
            .iter()
            .map(|slot| SlotView {
                index: slot.task.index,
                total: slot.task.total,
                progress: slot.record().snapshot(),
            })
            .collect()
    }
}
