//! Repository port for adverse events.

use crate::{
    participant::domain::ParticipantId,
    safety::domain::{AdverseEvent, AdverseEventId, AdverseEventStatus},
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for adverse event repository operations.
pub type AdverseEventRepositoryResult<T> = Result<T, AdverseEventRepositoryError>;

/// Adverse event persistence contract.
#[async_trait]
pub trait AdverseEventRepository: Send + Sync {
    /// Stores a new event.
    ///
    /// # Errors
    ///
    /// Returns [`AdverseEventRepositoryError::DuplicateEvent`] when the
    /// identifier exists.
    async fn store(&self, event: &AdverseEvent) -> AdverseEventRepositoryResult<()>;

    /// Persists changes to an existing event only while the stored copy
    /// still has review status `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`AdverseEventRepositoryError::NotFound`] when the event does
    /// not exist, or [`AdverseEventRepositoryError::StatusConflict`] when
    /// another reviewer changed its status first.
    async fn update_if_status(
        &self,
        event: &AdverseEvent,
        expected: AdverseEventStatus,
    ) -> AdverseEventRepositoryResult<()>;

    /// Finds an event by identifier.
    async fn find_by_id(&self, id: AdverseEventId)
    -> AdverseEventRepositoryResult<Option<AdverseEvent>>;

    /// Returns a participant's events, newest first.
    async fn list_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> AdverseEventRepositoryResult<Vec<AdverseEvent>>;

    /// Returns at most `limit` events across all participants, newest
    /// first.
    async fn list_recent(&self, limit: usize) -> AdverseEventRepositoryResult<Vec<AdverseEvent>>;
}

/// Errors returned by adverse event repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AdverseEventRepositoryError {
    /// An event with the same identifier already exists.
    #[error("duplicate adverse event identifier: {0}")]
    DuplicateEvent(AdverseEventId),

    /// The event was not found.
    #[error("adverse event not found: {0}")]
    NotFound(AdverseEventId),

    /// The stored review status no longer matches the expected one.
    #[error("adverse event {id} is {actual}, expected {expected}")]
    StatusConflict {
        /// Event identifier.
        id: AdverseEventId,
        /// Status the writer read.
        expected: AdverseEventStatus,
        /// Status currently stored.
        actual: AdverseEventStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AdverseEventRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
