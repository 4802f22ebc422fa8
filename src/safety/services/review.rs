//! Adverse event reporting, triage, and review status changes.

use crate::{
    config::CohortConfig,
    error::ErrorKind,
    participant::domain::ParticipantId,
    safety::{
        domain::{
            AdverseEvent, AdverseEventId, AdverseEventReport, AdverseEventSeverity,
            AdverseEventStatus, AdverseEventStatusPolicy, ParseAdverseEventStatusError,
            SafetyDomainError,
        },
        ports::{
            AdverseEventRepository, AdverseEventRepositoryError, EscalationEvent,
            EscalationNotifier,
        },
    },
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for reporting an adverse event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAdverseEventRequest {
    participant_id: ParticipantId,
    description: String,
    onset_date: NaiveDate,
    severity: AdverseEventSeverity,
    action_taken: Option<String>,
}

impl ReportAdverseEventRequest {
    /// Creates a report request with the required fields.
    #[must_use]
    pub fn new(
        participant_id: ParticipantId,
        description: impl Into<String>,
        onset_date: NaiveDate,
        severity: AdverseEventSeverity,
    ) -> Self {
        Self {
            participant_id,
            description: description.into(),
            onset_date,
            severity,
            action_taken: None,
        }
    }

    /// Records the action already taken by the site.
    #[must_use]
    pub fn with_action_taken(mut self, action_taken: impl Into<String>) -> Self {
        self.action_taken = Some(action_taken.into());
        self
    }

    /// Returns the affected participant.
    #[must_use]
    pub const fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }
}

/// Service-level errors for safety operations.
#[derive(Debug, Error)]
pub enum SafetyError {
    /// Domain validation or the review policy rejected the request.
    #[error(transparent)]
    Domain(#[from] SafetyDomainError),
    /// The status label is not a review status.
    #[error(transparent)]
    InvalidStatus(#[from] ParseAdverseEventStatusError),
    /// No event exists with the given identifier.
    #[error("adverse event {0} not found")]
    NotFound(AdverseEventId),
    /// Concurrent reviewers kept changing the event until retries ran out.
    #[error("adverse event {event_id} changed concurrently {attempts} times")]
    ConcurrentModification {
        /// Event identifier.
        event_id: AdverseEventId,
        /// Attempts made.
        attempts: u32,
    },
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AdverseEventRepositoryError),
}

impl SafetyError {
    /// Classifies the error for the calling layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(SafetyDomainError::EmptyDescription) => ErrorKind::Validation,
            Self::Domain(SafetyDomainError::StatusChangeNotPermitted { .. })
            | Self::InvalidStatus(_) => ErrorKind::InvalidStatus,
            Self::NotFound(_) | Self::Repository(AdverseEventRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::ConcurrentModification { .. } | Self::Repository(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for safety operations.
pub type SafetyResult<T> = Result<T, SafetyError>;

/// Adverse event reporting and review service.
#[derive(Clone)]
pub struct SafetyService<R, N, C>
where
    R: AdverseEventRepository,
    N: EscalationNotifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<C>,
    status_policy: AdverseEventStatusPolicy,
    list_limit: usize,
    max_update_attempts: u32,
}

impl<R, N, C> SafetyService<R, N, C>
where
    R: AdverseEventRepository,
    N: EscalationNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a safety service using the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self::with_config(repository, notifier, clock, &CohortConfig::default())
    }

    /// Creates a safety service honouring `config`.
    #[must_use]
    pub const fn with_config(
        repository: Arc<R>,
        notifier: Arc<N>,
        clock: Arc<C>,
        config: &CohortConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            clock,
            status_policy: config.adverse_event_status_policy,
            list_limit: config.adverse_event_list_limit,
            max_update_attempts: config.max_transition_attempts,
        }
    }

    /// Triages and stores a new adverse event.
    ///
    /// Escalated events are announced to the notifier after the write. A
    /// delivery failure is logged and does not fail the report.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Domain`] for a blank description or
    /// repository errors.
    pub async fn report_adverse_event(
        &self,
        request: ReportAdverseEventRequest,
    ) -> SafetyResult<AdverseEvent> {
        let mut report =
            AdverseEventReport::new(request.description, request.onset_date, request.severity)?;
        if let Some(action_taken) = request.action_taken {
            report = report.with_action_taken(action_taken);
        }
        let event = AdverseEvent::report(request.participant_id, report, &*self.clock);
        self.repository.store(&event).await?;
        info!(
            adverse_event_id = %event.id(),
            participant_id = %event.participant_id(),
            severity = %event.severity(),
            escalated = event.escalated(),
            "reported adverse event"
        );

        if event.escalated() {
            self.announce(&event).await;
        }
        Ok(event)
    }

    /// Moves an event to a new review status given by label.
    ///
    /// The write only lands while the stored status is the one the policy
    /// was checked against. On a conflict the event is re-read and the
    /// policy applied again.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::InvalidStatus`] for an unknown label,
    /// [`SafetyError::Domain`] when the review policy rejects the change,
    /// [`SafetyError::NotFound`], [`SafetyError::ConcurrentModification`]
    /// when retries run out, or repository errors.
    pub async fn update_adverse_event_status(
        &self,
        event_id: AdverseEventId,
        status: &str,
    ) -> SafetyResult<AdverseEvent> {
        let parsed = AdverseEventStatus::try_from(status)?;
        let attempts = self.max_update_attempts.max(1);
        for attempt in 1..=attempts {
            let mut event = self
                .repository
                .find_by_id(event_id)
                .await?
                .ok_or(SafetyError::NotFound(event_id))?;
            let from = event.status();
            if !event.update_status(parsed, self.status_policy, &*self.clock)? {
                return Ok(event);
            }
            match self.repository.update_if_status(&event, from).await {
                Ok(()) => {
                    info!(
                        adverse_event_id = %event_id,
                        %from,
                        to = %parsed,
                        "updated adverse event status"
                    );
                    return Ok(event);
                }
                Err(AdverseEventRepositoryError::StatusConflict { actual, .. }) => {
                    debug!(
                        adverse_event_id = %event_id,
                        attempt,
                        %from,
                        %actual,
                        "adverse event status conflict, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(SafetyError::ConcurrentModification { event_id, attempts })
    }

    /// Finds an event by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, event_id: AdverseEventId) -> SafetyResult<Option<AdverseEvent>> {
        Ok(self.repository.find_by_id(event_id).await?)
    }

    /// Lists a participant's events, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Repository`] when lookup fails.
    pub async fn list_for_participant(
        &self,
        participant_id: ParticipantId,
    ) -> SafetyResult<Vec<AdverseEvent>> {
        Ok(self.repository.list_by_participant(participant_id).await?)
    }

    /// Lists the most recent events across all participants, bounded by
    /// the configured listing limit.
    ///
    /// # Errors
    ///
    /// Returns [`SafetyError::Repository`] when lookup fails.
    pub async fn list_all(&self) -> SafetyResult<Vec<AdverseEvent>> {
        Ok(self.repository.list_recent(self.list_limit).await?)
    }

    async fn announce(&self, event: &AdverseEvent) {
        let escalation = EscalationEvent {
            adverse_event_id: event.id(),
            participant_id: event.participant_id(),
            severity: event.severity(),
        };
        if let Err(err) = self.notifier.notify(escalation).await {
            warn!(
                adverse_event_id = %event.id(),
                participant_id = %event.participant_id(),
                error = %err,
                "escalation notification failed"
            );
        }
    }
}
