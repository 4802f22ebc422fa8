//! Authenticated caller identity supplied by the auth collaborator.
//!
//! Credential verification happens outside this crate. The workflow trusts
//! the identity it is handed and only checks the role against each
//! operation.

use crate::participant::domain::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Role carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallerRole {
    /// A study participant acting on their own record.
    Participant,
    /// Site coordinator.
    Coordinator,
    /// Principal investigator.
    Pi,
    /// Data manager with read access to collected data.
    DataManager,
    /// Study sponsor.
    Sponsor,
    /// Platform administrator.
    Admin,
}

impl CallerRole {
    /// Returns the canonical label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Participant => "PARTICIPANT",
            Self::Coordinator => "COORDINATOR",
            Self::Pi => "PI",
            Self::DataManager => "DATA_MANAGER",
            Self::Sponsor => "SPONSOR",
            Self::Admin => "ADMIN",
        }
    }

    /// Returns `true` for roles allowed to administer participants and
    /// safety reviews.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Coordinator | Self::Pi)
    }
}

impl fmt::Display for CallerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CallerRole {
    type Error = ParseCallerRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "PARTICIPANT" => Ok(Self::Participant),
            "COORDINATOR" => Ok(Self::Coordinator),
            "PI" => Ok(Self::Pi),
            "DATA_MANAGER" => Ok(Self::DataManager),
            "SPONSOR" => Ok(Self::Sponsor),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(ParseCallerRoleError(value.to_owned())),
        }
    }
}

/// Error returned while parsing a caller role label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown caller role: {0}")]
pub struct ParseCallerRoleError(pub String);

/// Identity of the authenticated caller of a workflow entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    user_id: UserId,
    role: CallerRole,
}

impl Caller {
    /// Creates a caller from an already verified identity.
    #[must_use]
    pub const fn new(user_id: UserId, role: CallerRole) -> Self {
        Self { user_id, role }
    }

    /// Returns the caller's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the caller's role.
    #[must_use]
    pub const fn role(&self) -> CallerRole {
        self.role
    }

    /// Returns `true` when the caller holds a staff role.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}
