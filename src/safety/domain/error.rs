//! Error types for adverse event validation and parsing.

use super::{AdverseEventId, AdverseEventStatus};
use thiserror::Error;

/// Errors returned while reporting or reviewing adverse events.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SafetyDomainError {
    /// The event description is empty after trimming.
    #[error("adverse event description must not be empty")]
    EmptyDescription,

    /// The review policy does not allow this status change.
    #[error("adverse event {event_id} cannot move from {from} to {to}")]
    StatusChangeNotPermitted {
        /// Event identifier.
        event_id: AdverseEventId,
        /// Current review status.
        from: AdverseEventStatus,
        /// Requested review status.
        to: AdverseEventStatus,
    },
}

/// Error returned while parsing an adverse event status label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown adverse event status: {0}")]
pub struct ParseAdverseEventStatusError(pub String);

/// Error returned while parsing a severity label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown adverse event severity: {0}")]
pub struct ParseSeverityError(pub String);
