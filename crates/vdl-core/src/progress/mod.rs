//! Shared progress model: one record per task attempt, grouped on a board
//! that the dashboard reads while job runners write.

mod board;
mod record;

pub use board::{ProgressBoard, SlotView, Task, TaskSlot};
pub use record::{ProgressRecord, ProgressSnapshot, TaskState, UNKNOWN};
