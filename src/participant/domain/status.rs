//! Participant lifecycle states and the allowed-transition graph.
//!
//! ```text
//! LEAD -> SCREENED -> CONSENTED -> ENROLLED -> ACTIVE -> COMPLETED
//!   \________\___________\___________\__________\-----> WITHDRAWN
//! ```
//!
//! `COMPLETED` and `WITHDRAWN` are terminal. A screening verdict may also
//! return a `SCREENED` participant to `LEAD`; that edge is not available to
//! administrative requests.

use super::{ParseParticipantStatusError, ParticipantDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    /// Prospective participant, not yet screened.
    Lead,
    /// Passed the eligibility screener.
    Screened,
    /// Signed informed consent.
    Consented,
    /// Enrolled in the study; the schedule starts here.
    Enrolled,
    /// Actively completing study tasks.
    Active,
    /// Finished the study.
    Completed,
    /// Left the study.
    Withdrawn,
}

/// Why a status change is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// A staff member or workflow requested the change.
    Administrative,
    /// A screener verdict is being applied.
    Screening,
}

use ParticipantStatus::{Active, Completed, Consented, Enrolled, Lead, Screened, Withdrawn};

/// Edges available to administrative requests.
const ADMINISTRATIVE_EDGES: [(ParticipantStatus, ParticipantStatus); 10] = [
    (Lead, Screened),
    (Screened, Consented),
    (Consented, Enrolled),
    (Enrolled, Active),
    (Active, Completed),
    (Lead, Withdrawn),
    (Screened, Withdrawn),
    (Consented, Withdrawn),
    (Enrolled, Withdrawn),
    (Active, Withdrawn),
];

/// Edges available when applying a screener verdict.
const SCREENING_EDGES: [(ParticipantStatus, ParticipantStatus); 2] =
    [(Lead, Screened), (Screened, Lead)];

impl ParticipantStatus {
    /// Every lifecycle state in graph order.
    pub const ALL: [Self; 7] = [
        Lead, Screened, Consented, Enrolled, Active, Completed, Withdrawn,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "LEAD",
            Self::Screened => "SCREENED",
            Self::Consented => "CONSENTED",
            Self::Enrolled => "ENROLLED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Withdrawn => "WITHDRAWN",
        }
    }

    /// Returns `true` for states with no outgoing edges.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Withdrawn)
    }

    /// Returns `true` when `(self, target)` is an edge available to
    /// `cause`. Staying in the same state is not an edge.
    #[must_use]
    pub fn has_edge_to(self, target: Self, cause: TransitionCause) -> bool {
        let edges: &[(Self, Self)] = match cause {
            TransitionCause::Administrative => &ADMINISTRATIVE_EDGES,
            TransitionCause::Screening => &SCREENING_EDGES,
        };
        edges.contains(&(self, target))
    }

    /// Returns `true` when an administrative request may move from `self`
    /// to `target`.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.has_edge_to(target, TransitionCause::Administrative)
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ParticipantStatus {
    type Error = ParseParticipantStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseParticipantStatusError(value.to_owned()))
    }
}

/// Validates a requested status change for `cause`.
///
/// Returns the state the participant ends up in. Requesting the current
/// state is a no-op success.
///
/// # Errors
///
/// Returns [`ParticipantDomainError::InvalidTransition`] when
/// `(current, requested)` is not an edge available to `cause`.
///
/// # Examples
///
/// ```
/// use cohort::participant::domain::{
///     ParticipantDomainError, ParticipantStatus, TransitionCause, validate_transition,
/// };
///
/// let next = validate_transition(
///     ParticipantStatus::Lead,
///     ParticipantStatus::Screened,
///     TransitionCause::Administrative,
/// );
/// assert_eq!(next, Ok(ParticipantStatus::Screened));
///
/// let skipped = validate_transition(
///     ParticipantStatus::Lead,
///     ParticipantStatus::Enrolled,
///     TransitionCause::Administrative,
/// );
/// assert!(matches!(skipped, Err(ParticipantDomainError::InvalidTransition { .. })));
/// ```
pub fn validate_transition(
    current: ParticipantStatus,
    requested: ParticipantStatus,
    cause: TransitionCause,
) -> Result<ParticipantStatus, ParticipantDomainError> {
    if current == requested || current.has_edge_to(requested, cause) {
        return Ok(requested);
    }
    Err(ParticipantDomainError::InvalidTransition {
        from: current,
        to: requested,
    })
}
