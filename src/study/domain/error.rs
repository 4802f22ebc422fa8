//! Error types for study domain validation and eligibility evaluation.

use super::{StudyId, TaskDefinitionId};
use thiserror::Error;

/// Errors returned while constructing study domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StudyDomainError {
    /// The study title is empty after trimming.
    #[error("study title must not be empty")]
    EmptyTitle,

    /// The study description is empty after trimming.
    #[error("study description must not be empty")]
    EmptyDescription,

    /// The task definition title is empty after trimming.
    #[error("task definition title must not be empty")]
    EmptyTaskTitle,

    /// A task definition's offset and window together exceed the longest
    /// supported protocol.
    #[error("task at day {due_day_offset} lasting {window_days} days exceeds the schedule limit")]
    ScheduleTooLong {
        /// Requested day offset.
        due_day_offset: u32,
        /// Requested window length.
        window_days: u32,
    },

    /// An eligibility criterion references a blank question key.
    #[error("eligibility criterion must name a question")]
    EmptyQuestion,

    /// A task definition built for one study was added to another.
    #[error("task definition {definition_id} does not belong to study {study_id}")]
    ForeignTaskDefinition {
        /// Offending definition.
        definition_id: TaskDefinitionId,
        /// Study it was added to.
        study_id: StudyId,
    },
}

/// Errors returned while evaluating screener answers against a rule set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EligibilityError {
    /// The answers were collected with a different screener schema.
    #[error("screener schema version {actual} does not match rule set version {expected}")]
    SchemaVersionMismatch {
        /// Version the study's rule set expects.
        expected: u32,
        /// Version carried by the submitted answers.
        actual: u32,
    },

    /// A question required by a criterion was not answered.
    #[error("missing required screener answer: {0}")]
    MissingAnswer(String),

    /// An answer has the wrong shape for the criterion reading it.
    #[error("malformed screener answer for '{question}': {reason}")]
    MalformedAnswer {
        /// Question key.
        question: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Error returned while parsing a study status label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown study status: {0}")]
pub struct ParseStudyStatusError(pub String);

/// Error returned while parsing a task type label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task type: {0}")]
pub struct ParseTaskTypeError(pub String);
