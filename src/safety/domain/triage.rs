//! Severity classification and review status rules.

use super::{ParseAdverseEventStatusError, ParseSeverityError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clinical severity of an adverse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdverseEventSeverity {
    /// Mild.
    Mild,
    /// Moderate.
    Moderate,
    /// Severe.
    Severe,
    /// Life-threatening; always escalated.
    LifeThreatening,
}

impl AdverseEventSeverity {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mild => "MILD",
            Self::Moderate => "MODERATE",
            Self::Severe => "SEVERE",
            Self::LifeThreatening => "LIFE_THREATENING",
        }
    }
}

impl fmt::Display for AdverseEventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AdverseEventSeverity {
    type Error = ParseSeverityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MILD" => Ok(Self::Mild),
            "MODERATE" => Ok(Self::Moderate),
            "SEVERE" => Ok(Self::Severe),
            "LIFE_THREATENING" => Ok(Self::LifeThreatening),
            _ => Err(ParseSeverityError(value.to_owned())),
        }
    }
}

/// Review status of an adverse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdverseEventStatus {
    /// Awaiting safety review.
    UnderReview,
    /// Resolved by the site.
    Resolved,
    /// Escalated to the sponsor or safety board.
    Escalated,
    /// Review closed.
    Closed,
}

impl AdverseEventStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnderReview => "UNDER_REVIEW",
            Self::Resolved => "RESOLVED",
            Self::Escalated => "ESCALATED",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for AdverseEventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AdverseEventStatus {
    type Error = ParseAdverseEventStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UNDER_REVIEW" => Ok(Self::UnderReview),
            "RESOLVED" => Ok(Self::Resolved),
            "ESCALATED" => Ok(Self::Escalated),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(ParseAdverseEventStatusError(value.to_owned())),
        }
    }
}

/// Which review status changes are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdverseEventStatusPolicy {
    /// Any status may follow any other.
    #[default]
    Unrestricted,
    /// Closed reviews stay closed, and resolved events may only be closed
    /// or reopened for review.
    Restricted,
}

impl AdverseEventStatusPolicy {
    /// Returns `true` when the policy accepts moving from `from` to `to`.
    /// Keeping the current status is always accepted.
    #[must_use]
    pub fn permits(self, from: AdverseEventStatus, to: AdverseEventStatus) -> bool {
        use AdverseEventStatus::{Closed, Resolved, UnderReview};

        if from == to {
            return true;
        }
        match self {
            Self::Unrestricted => true,
            Self::Restricted => match from {
                Closed => false,
                Resolved => matches!(to, Closed | UnderReview),
                _ => true,
            },
        }
    }
}

/// Initial review state of a newly reported event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triage {
    /// Review status the event starts in.
    pub initial_status: AdverseEventStatus,
    /// Whether the event is escalated.
    pub escalated: bool,
}

/// Classifies a reported event by severity.
///
/// Every event starts `UNDER_REVIEW`; only `LIFE_THREATENING` escalates.
///
/// # Examples
///
/// ```
/// use cohort::safety::domain::{AdverseEventSeverity, AdverseEventStatus, triage};
///
/// let severe = triage(AdverseEventSeverity::Severe);
/// assert_eq!(severe.initial_status, AdverseEventStatus::UnderReview);
/// assert!(!severe.escalated);
///
/// assert!(triage(AdverseEventSeverity::LifeThreatening).escalated);
/// ```
#[must_use]
pub const fn triage(severity: AdverseEventSeverity) -> Triage {
    Triage {
        initial_status: AdverseEventStatus::UnderReview,
        escalated: matches!(severity, AdverseEventSeverity::LifeThreatening),
    }
}
