//! Adverse event aggregate.

use super::{
    AdverseEventId, AdverseEventSeverity, AdverseEventStatus, AdverseEventStatusPolicy,
    SafetyDomainError, triage,
};
use crate::participant::domain::ParticipantId;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated details of a newly reported adverse event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdverseEventReport {
    description: String,
    onset_date: NaiveDate,
    action_taken: Option<String>,
    severity: AdverseEventSeverity,
}

impl AdverseEventReport {
    /// Creates a report.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyDomainError::EmptyDescription`] for a blank
    /// description.
    pub fn new(
        description: impl Into<String>,
        onset_date: NaiveDate,
        severity: AdverseEventSeverity,
    ) -> Result<Self, SafetyDomainError> {
        let raw = description.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SafetyDomainError::EmptyDescription);
        }
        Ok(Self {
            description: trimmed.to_owned(),
            onset_date,
            action_taken: None,
            severity,
        })
    }

    /// Records the action already taken by the site.
    #[must_use]
    pub fn with_action_taken(mut self, action_taken: impl Into<String>) -> Self {
        self.action_taken = Some(action_taken.into());
        self
    }

    /// Returns the reported severity.
    #[must_use]
    pub const fn severity(&self) -> AdverseEventSeverity {
        self.severity
    }
}

/// A reported adverse event under safety review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdverseEvent {
    id: AdverseEventId,
    participant_id: ParticipantId,
    description: String,
    onset_date: NaiveDate,
    action_taken: Option<String>,
    severity: AdverseEventSeverity,
    status: AdverseEventStatus,
    escalated: bool,
    reported_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted adverse event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAdverseEventData {
    /// Persisted event identifier.
    pub id: AdverseEventId,
    /// Persisted participant reference.
    pub participant_id: ParticipantId,
    /// Persisted description.
    pub description: String,
    /// Persisted onset date.
    pub onset_date: NaiveDate,
    /// Persisted action taken, if any.
    pub action_taken: Option<String>,
    /// Persisted severity.
    pub severity: AdverseEventSeverity,
    /// Persisted review status.
    pub status: AdverseEventStatus,
    /// Persisted escalation flag.
    pub escalated: bool,
    /// Persisted report timestamp.
    pub reported_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AdverseEvent {
    /// Creates a triaged event for a participant.
    #[must_use]
    pub fn report(
        participant_id: ParticipantId,
        report: AdverseEventReport,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        let triaged = triage(report.severity);
        Self {
            id: AdverseEventId::new(),
            participant_id,
            description: report.description,
            onset_date: report.onset_date,
            action_taken: report.action_taken,
            severity: report.severity,
            status: triaged.initial_status,
            escalated: triaged.escalated,
            reported_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an event from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAdverseEventData) -> Self {
        Self {
            id: data.id,
            participant_id: data.participant_id,
            description: data.description,
            onset_date: data.onset_date,
            action_taken: data.action_taken,
            severity: data.severity,
            status: data.status,
            escalated: data.escalated,
            reported_at: data.reported_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the event identifier.
    #[must_use]
    pub const fn id(&self) -> AdverseEventId {
        self.id
    }

    /// Returns the affected participant.
    #[must_use]
    pub const fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the onset date.
    #[must_use]
    pub const fn onset_date(&self) -> NaiveDate {
        self.onset_date
    }

    /// Returns the action taken, if any.
    #[must_use]
    pub fn action_taken(&self) -> Option<&str> {
        self.action_taken.as_deref()
    }

    /// Returns the severity.
    #[must_use]
    pub const fn severity(&self) -> AdverseEventSeverity {
        self.severity
    }

    /// Returns the review status.
    #[must_use]
    pub const fn status(&self) -> AdverseEventStatus {
        self.status
    }

    /// Returns `true` when the event was escalated at report time.
    #[must_use]
    pub const fn escalated(&self) -> bool {
        self.escalated
    }

    /// Returns the report timestamp.
    #[must_use]
    pub const fn reported_at(&self) -> DateTime<Utc> {
        self.reported_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the event to a new review status under `policy`.
    ///
    /// The escalation flag is never touched. Returns `false` when the
    /// status was already `status`.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyDomainError::StatusChangeNotPermitted`] when the
    /// policy rejects the change.
    pub fn update_status(
        &mut self,
        status: AdverseEventStatus,
        policy: AdverseEventStatusPolicy,
        clock: &impl Clock,
    ) -> Result<bool, SafetyDomainError> {
        if !policy.permits(self.status, status) {
            return Err(SafetyDomainError::StatusChangeNotPermitted {
                event_id: self.id,
                from: self.status,
                to: status,
            });
        }
        if self.status == status {
            return Ok(false);
        }
        self.status = status;
        self.updated_at = clock.utc();
        Ok(true)
    }
}
