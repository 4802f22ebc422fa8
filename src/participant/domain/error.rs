//! Error types for participant lifecycle validation and parsing.

use super::{ParticipantId, ParticipantStatus};
use crate::study::domain::StudyId;
use thiserror::Error;

/// Errors returned while changing participant state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParticipantDomainError {
    /// The requested status change is not an edge of the lifecycle graph.
    #[error("invalid participant status transition from {from} to {to}")]
    InvalidTransition {
        /// Status the participant is in.
        from: ParticipantStatus,
        /// Status that was requested.
        to: ParticipantStatus,
    },

    /// The participant is already committed to a different study.
    #[error(
        "participant {participant_id} is assigned to study {current} and cannot be screened for {requested}"
    )]
    StudyReassignment {
        /// Participant identifier.
        participant_id: ParticipantId,
        /// Study already assigned.
        current: StudyId,
        /// Study the screener was submitted for.
        requested: StudyId,
    },

    /// The participant timezone is blank.
    #[error("participant timezone must not be empty")]
    EmptyTimezone,
}

/// Error returned while parsing a participant status label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown participant status: {0}")]
pub struct ParseParticipantStatusError(pub String);
