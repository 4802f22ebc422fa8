//! Participant aggregate root.

use super::{
    ParticipantDomainError, ParticipantId, ParticipantStatus, TransitionCause, UserId,
    validate_transition,
};
use crate::study::domain::{EligibilityVerdict, StudyId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEZONE: &str = "UTC";

/// Contact and scheduling preferences of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantProfile {
    phone: Option<String>,
    timezone: String,
    notes: Option<String>,
}

impl ParticipantProfile {
    /// Creates an empty profile in the `UTC` timezone.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phone: None,
            timezone: DEFAULT_TIMEZONE.to_owned(),
            notes: None,
        }
    }

    /// Sets the contact phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the participant's timezone name.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantDomainError::EmptyTimezone`] for a blank name.
    pub fn with_timezone(
        mut self,
        timezone: impl Into<String>,
    ) -> Result<Self, ParticipantDomainError> {
        let raw = timezone.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParticipantDomainError::EmptyTimezone);
        }
        self.timezone = trimmed.to_owned();
        Ok(self)
    }

    /// Sets coordinator notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the phone number, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the timezone name.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Returns coordinator notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

impl Default for ParticipantProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of applying a validated status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before the request.
    pub from: ParticipantStatus,
    /// Status after the request.
    pub to: ParticipantStatus,
}

impl StatusChange {
    /// Returns `true` when the status actually changed.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }

    /// Returns `true` when this change entered `status`.
    #[must_use]
    pub fn entered(&self, status: ParticipantStatus) -> bool {
        self.is_change() && self.to == status
    }
}

/// Participant aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: ParticipantId,
    user_id: UserId,
    study_id: Option<StudyId>,
    status: ParticipantStatus,
    profile: ParticipantProfile,
    enrolled_at: Option<DateTime<Utc>>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted participant aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedParticipantData {
    /// Persisted participant identifier.
    pub id: ParticipantId,
    /// Persisted owning user.
    pub user_id: UserId,
    /// Persisted study assignment, if any.
    pub study_id: Option<StudyId>,
    /// Persisted lifecycle status.
    pub status: ParticipantStatus,
    /// Persisted profile fields.
    pub profile: ParticipantProfile,
    /// Persisted enrollment timestamp, if enrolled.
    pub enrolled_at: Option<DateTime<Utc>>,
    /// Persisted optimistic-concurrency version.
    pub version: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// Creates a new lead for a user account.
    #[must_use]
    pub fn new(user_id: UserId, profile: ParticipantProfile, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ParticipantId::new(),
            user_id,
            study_id: None,
            status: ParticipantStatus::Lead,
            profile,
            enrolled_at: None,
            version: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a participant from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedParticipantData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            study_id: data.study_id,
            status: data.status,
            profile: data.profile,
            enrolled_at: data.enrolled_at,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the participant identifier.
    #[must_use]
    pub const fn id(&self) -> ParticipantId {
        self.id
    }

    /// Returns the owning user account.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the assigned study, if any.
    #[must_use]
    pub const fn study_id(&self) -> Option<StudyId> {
        self.study_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ParticipantStatus {
        self.status
    }

    /// Returns the profile fields.
    #[must_use]
    pub const fn profile(&self) -> &ParticipantProfile {
        &self.profile
    }

    /// Returns when the participant first entered `ENROLLED`.
    #[must_use]
    pub const fn enrolled_at(&self) -> Option<DateTime<Utc>> {
        self.enrolled_at
    }

    /// Returns the optimistic-concurrency version.
    ///
    /// Every accepted mutation increments it by one.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a status request validated against the lifecycle graph.
    ///
    /// Entering `ENROLLED` for the first time stamps `enrolled_at`; later
    /// transitions never move it. Requesting the current status leaves the
    /// participant untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantDomainError::InvalidTransition`] when the edge is
    /// not available to `cause`.
    pub fn transition_to(
        &mut self,
        requested: ParticipantStatus,
        cause: TransitionCause,
        clock: &impl Clock,
    ) -> Result<StatusChange, ParticipantDomainError> {
        let from = self.status;
        let to = validate_transition(from, requested, cause)?;
        let change = StatusChange { from, to };
        if !change.is_change() {
            return Ok(change);
        }

        self.status = to;
        self.touch(clock);
        if to == ParticipantStatus::Enrolled && self.enrolled_at.is_none() {
            self.enrolled_at = Some(self.updated_at);
        }
        Ok(change)
    }

    /// Applies a screener verdict for `study_id`.
    ///
    /// An eligible verdict advances the participant to `SCREENED`; an
    /// ineligible one keeps or returns them to `LEAD`. A lead may be
    /// screened for any study; once past `LEAD` the participant stays with
    /// the study they were screened for.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantDomainError::StudyReassignment`] when a screened
    /// participant submits for another study, or
    /// [`ParticipantDomainError::InvalidTransition`] when the participant is
    /// beyond screening.
    pub fn apply_screening(
        &mut self,
        study_id: StudyId,
        verdict: &EligibilityVerdict,
        clock: &impl Clock,
    ) -> Result<StatusChange, ParticipantDomainError> {
        let conflicting = self.study_id.filter(|current| {
            *current != study_id && self.status != ParticipantStatus::Lead
        });
        if let Some(current) = conflicting {
            return Err(ParticipantDomainError::StudyReassignment {
                participant_id: self.id,
                current,
                requested: study_id,
            });
        }

        let requested = if verdict.is_eligible() {
            ParticipantStatus::Screened
        } else {
            ParticipantStatus::Lead
        };
        let reassigned = self.study_id != Some(study_id);
        let change = self.transition_to(requested, TransitionCause::Screening, clock)?;
        if reassigned {
            self.study_id = Some(study_id);
            if !change.is_change() {
                self.touch(clock);
            }
        }
        Ok(change)
    }

    /// Replaces the profile fields.
    pub fn update_profile(&mut self, profile: ParticipantProfile, clock: &impl Clock) {
        self.profile = profile;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
        self.version += 1;
    }
}
