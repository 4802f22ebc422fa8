//! Error classification shared by every service boundary.
//!
//! Each service error maps onto one [`ErrorKind`] so that a calling layer
//! (for example an HTTP route) can choose a response without re-deriving
//! the reason from the error message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a rejected core operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The requested status change is not an edge of the lifecycle graph.
    InvalidTransition,
    /// A status label did not name a known lifecycle state.
    UnknownState,
    /// Task generation was attempted without a study or enrollment date.
    NotEnrolled,
    /// Task instances already exist for the requested definitions.
    AlreadyGenerated,
    /// A referenced entity does not exist.
    NotFound,
    /// An adverse-event status is outside the allowed set or policy.
    InvalidStatus,
    /// Input was malformed.
    Validation,
    /// The caller's role does not permit the operation.
    Forbidden,
    /// The persistence collaborator failed.
    Storage,
}

impl ErrorKind {
    /// Returns the canonical label for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::UnknownState => "UNKNOWN_STATE",
            Self::NotEnrolled => "NOT_ENROLLED",
            Self::AlreadyGenerated => "ALREADY_GENERATED",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::Validation => "VALIDATION",
            Self::Forbidden => "FORBIDDEN",
            Self::Storage => "STORAGE",
        }
    }

    /// Returns `true` when retrying the same request may succeed.
    ///
    /// Only storage failures are retryable; business-rule rejections are
    /// deterministic.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Storage)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
