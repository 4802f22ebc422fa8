//! Protocol task definitions and their scheduling offsets.

use super::{ParseTaskTypeError, StudyDomainError, StudyId, TaskDefinitionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest protocol a definition may span, counting both its offset and
/// its window.
pub const MAX_SCHEDULE_DAYS: u32 = 36_500;

/// Kind of work a task asks of the participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Questionnaire or data-entry form.
    #[default]
    Form,
    /// Longer survey instrument.
    Survey,
    /// On-site or remote study visit.
    Visit,
    /// Biological sample collection.
    Sample,
}

impl TaskType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Form => "FORM",
            Self::Survey => "SURVEY",
            Self::Visit => "VISIT",
            Self::Sample => "SAMPLE",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseTaskTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "FORM" => Ok(Self::Form),
            "SURVEY" => Ok(Self::Survey),
            "VISIT" => Ok(Self::Visit),
            "SAMPLE" => Ok(Self::Sample),
            _ => Err(ParseTaskTypeError(value.to_owned())),
        }
    }
}

/// A recurring piece of protocol work, scheduled relative to enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    id: TaskDefinitionId,
    study_id: StudyId,
    title: String,
    description: Option<String>,
    task_type: TaskType,
    due_day_offset: u32,
    window_days: u32,
}

impl TaskDefinition {
    /// Creates a task definition.
    ///
    /// `due_day_offset` is the number of days after enrollment the task
    /// becomes available; `window_days` is how long it stays open.
    ///
    /// # Errors
    ///
    /// Returns [`StudyDomainError::EmptyTaskTitle`] when the title is blank,
    /// or [`StudyDomainError::ScheduleTooLong`] when the offset and window
    /// together exceed [`MAX_SCHEDULE_DAYS`].
    pub fn new(
        study_id: StudyId,
        title: impl Into<String>,
        due_day_offset: u32,
        window_days: u32,
    ) -> Result<Self, StudyDomainError> {
        let raw = title.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StudyDomainError::EmptyTaskTitle);
        }
        let span = u64::from(due_day_offset) + u64::from(window_days);
        if span > u64::from(MAX_SCHEDULE_DAYS) {
            return Err(StudyDomainError::ScheduleTooLong {
                due_day_offset,
                window_days,
            });
        }
        Ok(Self {
            id: TaskDefinitionId::new(),
            study_id,
            title: trimmed.to_owned(),
            description: None,
            task_type: TaskType::default(),
            due_day_offset,
            window_days,
        })
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    /// Returns the definition identifier.
    #[must_use]
    pub const fn id(&self) -> TaskDefinitionId {
        self.id
    }

    /// Returns the owning study.
    #[must_use]
    pub const fn study_id(&self) -> StudyId {
        self.study_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the days between enrollment and availability.
    #[must_use]
    pub const fn due_day_offset(&self) -> u32 {
        self.due_day_offset
    }

    /// Returns the completion window length in days.
    #[must_use]
    pub const fn window_days(&self) -> u32 {
        self.window_days
    }
}
