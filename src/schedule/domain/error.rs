//! Error types for schedule planning.

use crate::{participant::domain::ParticipantId, study::domain::TaskDefinitionId};
use thiserror::Error;

/// Errors returned while planning a participant's schedule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleDomainError {
    /// The participant has no study assignment or enrollment timestamp.
    #[error("participant {0} is not enrolled in a study")]
    NotEnrolled(ParticipantId),

    /// A task definition's offsets put its window past the calendar range.
    #[error("window of task definition {0} is out of range")]
    WindowOutOfRange(TaskDefinitionId),
}

/// Error returned while parsing a task instance status label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task instance status: {0}")]
pub struct ParseTaskInstanceStatusError(pub String);
