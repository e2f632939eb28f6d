//! Map task errors onto retry policy failure kinds.

use crate::retry::policy::FailureKind;
use crate::runner::TaskError;

pub fn classify(e: &TaskError) -> FailureKind {
    match e {
        TaskError::Exit { .. } => FailureKind::Exit,
        TaskError::Launch { .. } | TaskError::Stream { .. } => FailureKind::Launch,
        TaskError::Panicked { .. } => FailureKind::Internal,
    }
}
