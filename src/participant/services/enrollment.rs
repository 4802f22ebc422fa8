//! Enrollment orchestration: registration, screener submission, and
//! compare-and-swap status transitions.

use crate::{
    config::CohortConfig,
    error::ErrorKind,
    participant::{
        domain::{
            ParseParticipantStatusError, Participant, ParticipantDomainError, ParticipantId,
            ParticipantProfile, ParticipantStatus, ScreenerResponse, StatusChange,
            TransitionCause, UserId,
        },
        ports::{
            ParticipantFilter, ParticipantRepository, ParticipantRepositoryError,
            ScreenerResponseRepository,
        },
    },
    study::{
        domain::{ScreenerAnswers, StudyId},
        ports::StudyRepository,
        services::{EligibilityEvaluationError, EligibilityEvaluator},
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for registering a user as a prospective participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterParticipantRequest {
    user_id: UserId,
    profile: ParticipantProfile,
}

impl RegisterParticipantRequest {
    /// Creates a request with an empty profile.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            profile: ParticipantProfile::default(),
        }
    }

    /// Sets the initial profile.
    #[must_use]
    pub fn with_profile(mut self, profile: ParticipantProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Request payload for submitting screener answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitScreenerRequest {
    participant_id: ParticipantId,
    study_id: StudyId,
    answers: ScreenerAnswers,
}

impl SubmitScreenerRequest {
    /// Creates a screener submission.
    #[must_use]
    pub const fn new(
        participant_id: ParticipantId,
        study_id: StudyId,
        answers: ScreenerAnswers,
    ) -> Self {
        Self {
            participant_id,
            study_id,
            answers,
        }
    }

    /// Returns the submitting participant.
    #[must_use]
    pub const fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// Returns the study screened for.
    #[must_use]
    pub const fn study_id(&self) -> StudyId {
        self.study_id
    }
}

/// Request payload for an administrative status change.
///
/// The status is carried as a label and parsed by the service so that an
/// unknown label surfaces as [`ErrorKind::UnknownState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionParticipantRequest {
    participant_id: ParticipantId,
    status: String,
}

impl TransitionParticipantRequest {
    /// Creates a transition request.
    #[must_use]
    pub fn new(participant_id: ParticipantId, status: impl Into<String>) -> Self {
        Self {
            participant_id,
            status: status.into(),
        }
    }

    /// Returns the participant to transition.
    #[must_use]
    pub const fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// Returns the requested status label.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }
}

/// Participant state after a status request, with the change applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    /// Participant as persisted.
    pub participant: Participant,
    /// Status before and after.
    pub change: StatusChange,
}

/// Result of a screener submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenerOutcome {
    /// Participant as persisted after applying the verdict.
    pub participant: Participant,
    /// Recorded response.
    pub response: ScreenerResponse,
    /// Status before and after.
    pub change: StatusChange,
}

/// Service-level errors for enrollment operations.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// A lifecycle rule rejected the request.
    #[error(transparent)]
    Domain(#[from] ParticipantDomainError),
    /// The requested status label is not a lifecycle state.
    #[error(transparent)]
    UnknownState(#[from] ParseParticipantStatusError),
    /// Screener evaluation failed.
    #[error(transparent)]
    Eligibility(#[from] EligibilityEvaluationError),
    /// No participant exists with the given identifier.
    #[error("participant {0} not found")]
    NotFound(ParticipantId),
    /// Every compare-and-swap attempt lost to a concurrent writer.
    #[error("participant {participant_id} was modified concurrently {attempts} times")]
    ConcurrentModification {
        /// Participant identifier.
        participant_id: ParticipantId,
        /// Attempts made.
        attempts: u32,
    },
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ParticipantRepositoryError),
}

impl EnrollmentError {
    /// Classifies the error for the calling layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(ParticipantDomainError::InvalidTransition { .. }) => {
                ErrorKind::InvalidTransition
            }
            Self::Domain(_)
            | Self::Repository(
                ParticipantRepositoryError::DuplicateUser(_)
                | ParticipantRepositoryError::DuplicateParticipant(_),
            ) => ErrorKind::Validation,
            Self::UnknownState(_) => ErrorKind::UnknownState,
            Self::Eligibility(err) => err.kind(),
            Self::NotFound(_) | Self::Repository(ParticipantRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::ConcurrentModification { .. } | Self::Repository(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for enrollment operations.
pub type EnrollmentResult<T> = Result<T, EnrollmentError>;

/// Participant enrollment orchestration service.
#[derive(Clone)]
pub struct EnrollmentService<P, S, St, C>
where
    P: ParticipantRepository,
    S: ScreenerResponseRepository,
    St: StudyRepository,
    C: Clock + Send + Sync,
{
    participants: Arc<P>,
    screeners: Arc<S>,
    evaluator: EligibilityEvaluator<St>,
    clock: Arc<C>,
    max_transition_attempts: u32,
}

impl<P, S, St, C> EnrollmentService<P, S, St, C>
where
    P: ParticipantRepository,
    S: ScreenerResponseRepository,
    St: StudyRepository,
    C: Clock + Send + Sync,
{
    /// Creates an enrollment service using the default configuration.
    #[must_use]
    pub fn new(participants: Arc<P>, screeners: Arc<S>, studies: Arc<St>, clock: Arc<C>) -> Self {
        Self::with_config(
            participants,
            screeners,
            studies,
            clock,
            &CohortConfig::default(),
        )
    }

    /// Creates an enrollment service honouring `config`.
    #[must_use]
    pub const fn with_config(
        participants: Arc<P>,
        screeners: Arc<S>,
        studies: Arc<St>,
        clock: Arc<C>,
        config: &CohortConfig,
    ) -> Self {
        Self {
            participants,
            screeners,
            evaluator: EligibilityEvaluator::new(studies),
            clock,
            max_transition_attempts: config.max_transition_attempts,
        }
    }

    /// Registers a user as a new `LEAD`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Repository`] when the user already has a
    /// participant record or persistence fails.
    pub async fn register_participant(
        &self,
        request: RegisterParticipantRequest,
    ) -> EnrollmentResult<Participant> {
        let participant = Participant::new(request.user_id, request.profile, &*self.clock);
        self.participants.store(&participant).await?;
        info!(
            participant_id = %participant.id(),
            user_id = %participant.user_id(),
            "registered participant"
        );
        Ok(participant)
    }

    /// Evaluates screener answers and applies the verdict to the
    /// participant's status.
    ///
    /// An eligible verdict moves the participant to `SCREENED`; an
    /// ineligible one keeps or returns them to `LEAD`. The verdict is
    /// checked against the participant before anything is written, then
    /// the response is recorded, then the status is written. If the status
    /// write fails after that, the response stays recorded and the
    /// participant keeps their previous status, so a resubmission is safe.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] for an unknown participant,
    /// [`EnrollmentError::Eligibility`] when the study is unknown, closed,
    /// or the answers are malformed, [`EnrollmentError::Domain`] when the
    /// participant is past screening, or repository errors.
    pub async fn submit_screener(
        &self,
        request: SubmitScreenerRequest,
    ) -> EnrollmentResult<ScreenerOutcome> {
        let SubmitScreenerRequest {
            participant_id,
            study_id,
            answers,
        } = request;
        let mut current = self.require(participant_id).await?;

        let verdict = self.evaluator.evaluate(study_id, &answers).await?;
        let clock = &*self.clock;
        current.apply_screening(study_id, &verdict, clock)?;

        let response = ScreenerResponse::record(participant_id, study_id, answers, verdict, clock);
        self.screeners.store(&response).await?;
        let StatusTransition {
            participant,
            change,
        } = self
            .update_with_retry(participant_id, |participant| {
                participant.apply_screening(study_id, response.verdict(), clock)
            })
            .await?;
        info!(
            %participant_id,
            %study_id,
            eligible = response.is_eligible(),
            from = %change.from,
            to = %change.to,
            "recorded screener response"
        );
        Ok(ScreenerOutcome {
            participant,
            response,
            change,
        })
    }

    /// Applies an administrative status change requested by label.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::UnknownState`] for an unknown label,
    /// [`EnrollmentError::Domain`] for a change that is not an edge of the
    /// lifecycle graph, [`EnrollmentError::NotFound`], or
    /// [`EnrollmentError::ConcurrentModification`] when retries run out.
    pub async fn transition_participant_status(
        &self,
        request: TransitionParticipantRequest,
    ) -> EnrollmentResult<StatusTransition> {
        let status = ParticipantStatus::try_from(request.status.as_str())?;
        self.request_status(
            request.participant_id,
            status,
            TransitionCause::Administrative,
        )
        .await
    }

    /// Applies a typed status change for `cause`.
    ///
    /// # Errors
    ///
    /// See [`EnrollmentService::transition_participant_status`].
    pub async fn request_status(
        &self,
        participant_id: ParticipantId,
        status: ParticipantStatus,
        cause: TransitionCause,
    ) -> EnrollmentResult<StatusTransition> {
        let clock = &*self.clock;
        let transition = self
            .update_with_retry(participant_id, |participant| {
                participant.transition_to(status, cause, clock)
            })
            .await?;
        if transition.change.is_change() {
            info!(
                %participant_id,
                from = %transition.change.from,
                to = %transition.change.to,
                "participant status changed"
            );
        } else {
            debug!(%participant_id, status = %status, "participant already in requested status");
        }
        Ok(transition)
    }

    /// Replaces a participant's profile fields.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::NotFound`] or repository errors.
    pub async fn update_profile(
        &self,
        participant_id: ParticipantId,
        profile: &ParticipantProfile,
    ) -> EnrollmentResult<Participant> {
        let clock = &*self.clock;
        let transition = self
            .update_with_retry(participant_id, |participant| {
                participant.update_profile(profile.clone(), clock);
                let status = participant.status();
                Ok(StatusChange {
                    from: status,
                    to: status,
                })
            })
            .await?;
        Ok(transition.participant)
    }

    /// Finds a participant by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Repository`] when lookup fails.
    pub async fn find_by_id(
        &self,
        participant_id: ParticipantId,
    ) -> EnrollmentResult<Option<Participant>> {
        Ok(self.participants.find_by_id(participant_id).await?)
    }

    /// Finds the participant record owned by a user.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Repository`] when lookup fails.
    pub async fn find_by_user_id(&self, user_id: UserId) -> EnrollmentResult<Option<Participant>> {
        Ok(self.participants.find_by_user_id(user_id).await?)
    }

    /// Lists participants matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Repository`] when lookup fails.
    pub async fn list(&self, filter: ParticipantFilter) -> EnrollmentResult<Vec<Participant>> {
        Ok(self.participants.list(filter).await?)
    }

    /// Returns a participant's screener history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EnrollmentError::Repository`] when lookup fails.
    pub async fn screener_history(
        &self,
        participant_id: ParticipantId,
    ) -> EnrollmentResult<Vec<ScreenerResponse>> {
        Ok(self.screeners.find_by_participant(participant_id).await?)
    }

    async fn require(&self, participant_id: ParticipantId) -> EnrollmentResult<Participant> {
        self.participants
            .find_by_id(participant_id)
            .await?
            .ok_or(EnrollmentError::NotFound(participant_id))
    }

    /// Reads, mutates, and writes back a participant, re-reading on a
    /// version conflict. A mutation that leaves the version unchanged is
    /// not written.
    async fn update_with_retry<F>(
        &self,
        participant_id: ParticipantId,
        mut mutate: F,
    ) -> EnrollmentResult<StatusTransition>
    where
        F: FnMut(&mut Participant) -> Result<StatusChange, ParticipantDomainError> + Send,
    {
        let attempts = self.max_transition_attempts.max(1);
        for attempt in 1..=attempts {
            let mut participant = self.require(participant_id).await?;
            let expected_version = participant.version();
            let change = mutate(&mut participant)?;
            if participant.version() == expected_version {
                return Ok(StatusTransition {
                    participant,
                    change,
                });
            }

            match self
                .participants
                .update_if_version(&participant, expected_version)
                .await
            {
                Ok(()) => {
                    return Ok(StatusTransition {
                        participant,
                        change,
                    });
                }
                Err(ParticipantRepositoryError::VersionConflict { actual, .. }) => {
                    debug!(
                        %participant_id,
                        attempt,
                        expected_version,
                        actual,
                        "participant version conflict, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(EnrollmentError::ConcurrentModification {
            participant_id,
            attempts,
        })
    }
}
