//! Pure window arithmetic and schedule planning.

use super::{ScheduleDomainError, TaskInstance};
use crate::{participant::domain::Participant, study::domain::TaskDefinition};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// How generation treats definitions that already have an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicatePolicy {
    /// Keep and return the existing instance.
    #[default]
    Skip,
    /// Reject the whole request and write nothing.
    Fail,
}

/// Availability window of a task instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskWindow {
    available_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
}

impl TaskWindow {
    /// Computes the window of `definition` for a participant enrolled at
    /// `enrolled_at`.
    ///
    /// The task opens `due_day_offset` days after enrollment and is due
    /// `window_days` days after it opens.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::WindowOutOfRange`] when either date
    /// falls outside the representable calendar.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use cohort::schedule::domain::TaskWindow;
    /// use cohort::study::domain::{StudyId, TaskDefinition};
    ///
    /// let enrolled_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
    /// let definition = TaskDefinition::new(StudyId::new(), "Week one survey", 7, 3).unwrap();
    ///
    /// let window = TaskWindow::for_definition(enrolled_at, &definition).unwrap();
    ///
    /// assert_eq!(window.available_date(), Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());
    /// assert_eq!(window.due_date(), Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap());
    /// ```
    pub fn for_definition(
        enrolled_at: DateTime<Utc>,
        definition: &TaskDefinition,
    ) -> Result<Self, ScheduleDomainError> {
        Self::from_offsets(
            enrolled_at,
            definition.due_day_offset(),
            definition.window_days(),
        )
        .ok_or(ScheduleDomainError::WindowOutOfRange(definition.id()))
    }

    /// Computes a window from raw day counts, or `None` when a date would
    /// overflow.
    #[must_use]
    pub fn from_offsets(
        enrolled_at: DateTime<Utc>,
        due_day_offset: u32,
        window_days: u32,
    ) -> Option<Self> {
        let available_date = enrolled_at.checked_add_signed(days(due_day_offset)?)?;
        let due_date = available_date.checked_add_signed(days(window_days)?)?;
        Some(Self {
            available_date,
            due_date,
        })
    }

    /// Returns when the task opens.
    #[must_use]
    pub const fn available_date(&self) -> DateTime<Utc> {
        self.available_date
    }

    /// Returns when the task is due.
    #[must_use]
    pub const fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    /// Returns `true` when `at` falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.available_date <= at && at <= self.due_date
    }
}

fn days(count: u32) -> Option<TimeDelta> {
    TimeDelta::try_days(i64::from(count))
}

/// Plans one pending instance per definition, in definition order.
///
/// Nothing is persisted; the caller decides how to treat definitions that
/// already have an instance.
///
/// # Errors
///
/// Returns [`ScheduleDomainError::NotEnrolled`] when the participant has no
/// study assignment or enrollment timestamp, or
/// [`ScheduleDomainError::WindowOutOfRange`] when a definition's window
/// cannot be computed.
pub fn plan_schedule(
    participant: &Participant,
    definitions: &[TaskDefinition],
    clock: &impl Clock,
) -> Result<Vec<TaskInstance>, ScheduleDomainError> {
    let enrolled_at = participant
        .study_id()
        .and(participant.enrolled_at())
        .ok_or(ScheduleDomainError::NotEnrolled(participant.id()))?;

    definitions
        .iter()
        .map(|definition| {
            let window = TaskWindow::for_definition(enrolled_at, definition)?;
            Ok(TaskInstance::new(
                participant.id(),
                definition.id(),
                window,
                clock,
            ))
        })
        .collect()
}
