//! Repository ports for participants and their screener responses.

use crate::participant::domain::{
    Participant, ParticipantId, ParticipantStatus, ScreenerResponse, ScreenerResponseId, UserId,
};
use crate::study::domain::StudyId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for participant repository operations.
pub type ParticipantRepositoryResult<T> = Result<T, ParticipantRepositoryError>;

/// Optional constraints applied when listing participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantFilter {
    /// Only participants assigned to this study.
    pub study_id: Option<StudyId>,
    /// Only participants in this status.
    pub status: Option<ParticipantStatus>,
}

impl ParticipantFilter {
    /// Restricts the listing to one study.
    #[must_use]
    pub const fn for_study(mut self, study_id: StudyId) -> Self {
        self.study_id = Some(study_id);
        self
    }

    /// Restricts the listing to one status.
    #[must_use]
    pub const fn with_status(mut self, status: ParticipantStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns `true` when `participant` satisfies every constraint.
    #[must_use]
    pub fn matches(&self, participant: &Participant) -> bool {
        self.study_id
            .is_none_or(|study_id| participant.study_id() == Some(study_id))
            && self
                .status
                .is_none_or(|status| participant.status() == status)
    }
}

/// Participant persistence contract.
///
/// Status changes must go through [`ParticipantRepository::update_if_version`]
/// so that two writers racing from the same snapshot cannot both succeed.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Stores a new participant.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantRepositoryError::DuplicateParticipant`] when the
    /// identifier exists, or [`ParticipantRepositoryError::DuplicateUser`]
    /// when the user already has a participant record.
    async fn store(&self, participant: &Participant) -> ParticipantRepositoryResult<()>;

    /// Finds a participant by identifier.
    async fn find_by_id(&self, id: ParticipantId)
    -> ParticipantRepositoryResult<Option<Participant>>;

    /// Finds the participant record owned by a user.
    async fn find_by_user_id(
        &self,
        user_id: UserId,
    ) -> ParticipantRepositoryResult<Option<Participant>>;

    /// Replaces the stored participant only if its version still equals
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantRepositoryError::VersionConflict`] when another
    /// writer got there first, or [`ParticipantRepositoryError::NotFound`].
    async fn update_if_version(
        &self,
        participant: &Participant,
        expected_version: u64,
    ) -> ParticipantRepositoryResult<()>;

    /// Lists participants matching `filter`, oldest first.
    async fn list(&self, filter: ParticipantFilter)
    -> ParticipantRepositoryResult<Vec<Participant>>;
}

/// Screener response persistence contract. Responses are append-only.
#[async_trait]
pub trait ScreenerResponseRepository: Send + Sync {
    /// Stores a new response.
    ///
    /// # Errors
    ///
    /// Returns [`ParticipantRepositoryError::DuplicateScreenerResponse`] when
    /// the identifier exists.
    async fn store(&self, response: &ScreenerResponse) -> ParticipantRepositoryResult<()>;

    /// Returns a participant's responses, oldest first.
    async fn find_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> ParticipantRepositoryResult<Vec<ScreenerResponse>>;
}

/// Errors returned by participant repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ParticipantRepositoryError {
    /// A participant with the same identifier already exists.
    #[error("duplicate participant identifier: {0}")]
    DuplicateParticipant(ParticipantId),

    /// The user already owns a participant record.
    #[error("user {0} already has a participant record")]
    DuplicateUser(UserId),

    /// A screener response with the same identifier already exists.
    #[error("duplicate screener response identifier: {0}")]
    DuplicateScreenerResponse(ScreenerResponseId),

    /// The participant was not found.
    #[error("participant not found: {0}")]
    NotFound(ParticipantId),

    /// The stored version moved since the participant was read.
    #[error("participant {id} version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Participant identifier.
        id: ParticipantId,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ParticipantRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
