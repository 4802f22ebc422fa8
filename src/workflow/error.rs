//! Errors returned by workflow entry points.

use crate::{
    caller::CallerRole,
    error::ErrorKind,
    participant::{domain::ParticipantId, services::EnrollmentError},
    safety::services::SafetyError,
    schedule::{domain::TaskInstanceId, services::ScheduleError},
};
use thiserror::Error;

/// Workflow-level errors.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The caller's role does not permit the operation on this record.
    #[error("{role} may not {operation}")]
    Forbidden {
        /// Caller role.
        role: CallerRole,
        /// Operation that was refused.
        operation: &'static str,
    },
    /// The referenced participant does not exist.
    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),
    /// The referenced task instance does not exist.
    #[error("task instance {0} not found")]
    TaskInstanceNotFound(TaskInstanceId),
    /// Enrollment failed.
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
    /// Schedule operation failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    /// Safety operation failed.
    #[error(transparent)]
    Safety(#[from] SafetyError),
}

impl WorkflowError {
    /// Classifies the error for the calling layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::ParticipantNotFound(_) | Self::TaskInstanceNotFound(_) => ErrorKind::NotFound,
            Self::Enrollment(err) => err.kind(),
            Self::Schedule(err) => err.kind(),
            Self::Safety(err) => err.kind(),
        }
    }
}

/// Result type for workflow entry points.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
