//! Task instance aggregate.

use super::{ParseTaskInstanceStatusError, TaskInstanceId, TaskWindow};
use crate::{participant::domain::ParticipantId, study::domain::TaskDefinitionId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion state of a task instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskInstanceStatus {
    /// Not yet completed.
    #[default]
    Pending,
    /// Completed by the participant.
    Completed,
}

impl TaskInstanceStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TaskInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskInstanceStatus {
    type Error = ParseTaskInstanceStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(ParseTaskInstanceStatusError(value.to_owned())),
        }
    }
}

/// One scheduled occurrence of a task definition for a participant.
///
/// The window is fixed at creation; only completion mutates an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInstance {
    id: TaskInstanceId,
    participant_id: ParticipantId,
    task_definition_id: TaskDefinitionId,
    window: TaskWindow,
    status: TaskInstanceStatus,
    completed_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskInstanceData {
    /// Persisted instance identifier.
    pub id: TaskInstanceId,
    /// Persisted participant reference.
    pub participant_id: ParticipantId,
    /// Persisted task definition reference.
    pub task_definition_id: TaskDefinitionId,
    /// Persisted availability window.
    pub window: TaskWindow,
    /// Persisted completion state.
    pub status: TaskInstanceStatus,
    /// Persisted completion timestamp.
    pub completed_date: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskInstance {
    /// Creates a pending instance for a computed window.
    #[must_use]
    pub fn new(
        participant_id: ParticipantId,
        task_definition_id: TaskDefinitionId,
        window: TaskWindow,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: TaskInstanceId::new(),
            participant_id,
            task_definition_id,
            window,
            status: TaskInstanceStatus::Pending,
            completed_date: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an instance from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedTaskInstanceData) -> Self {
        Self {
            id: data.id,
            participant_id: data.participant_id,
            task_definition_id: data.task_definition_id,
            window: data.window,
            status: data.status,
            completed_date: data.completed_date,
            created_at: data.created_at,
        }
    }

    /// Returns the instance identifier.
    #[must_use]
    pub const fn id(&self) -> TaskInstanceId {
        self.id
    }

    /// Returns the participant the instance belongs to.
    #[must_use]
    pub const fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// Returns the definition the instance was generated from.
    #[must_use]
    pub const fn task_definition_id(&self) -> TaskDefinitionId {
        self.task_definition_id
    }

    /// Returns the availability window.
    #[must_use]
    pub const fn window(&self) -> TaskWindow {
        self.window
    }

    /// Returns when the task becomes available.
    #[must_use]
    pub const fn available_date(&self) -> DateTime<Utc> {
        self.window.available_date()
    }

    /// Returns when the task is due.
    #[must_use]
    pub const fn due_date(&self) -> DateTime<Utc> {
        self.window.due_date()
    }

    /// Returns the completion state.
    #[must_use]
    pub const fn status(&self) -> TaskInstanceStatus {
        self.status
    }

    /// Returns when the task was completed.
    #[must_use]
    pub const fn completed_date(&self) -> Option<DateTime<Utc>> {
        self.completed_date
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the instance completed.
    ///
    /// Returns `false` without touching the instance when it was already
    /// completed, so the first completion date is kept.
    pub fn complete(&mut self, clock: &impl Clock) -> bool {
        if self.status == TaskInstanceStatus::Completed {
            return false;
        }
        self.status = TaskInstanceStatus::Completed;
        self.completed_date = Some(clock.utc());
        true
    }
}
