//! In-memory screener response repository.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::participant::{
    domain::{ParticipantId, ScreenerResponse},
    ports::{ParticipantRepositoryError, ParticipantRepositoryResult, ScreenerResponseRepository},
};

/// Thread-safe append-only store of screener responses.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScreenerResponseRepository {
    responses: Arc<RwLock<Vec<ScreenerResponse>>>,
}

impl InMemoryScreenerResponseRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> ParticipantRepositoryError {
    ParticipantRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ScreenerResponseRepository for InMemoryScreenerResponseRepository {
    async fn store(&self, response: &ScreenerResponse) -> ParticipantRepositoryResult<()> {
        let mut responses = self.responses.write().map_err(lock_error)?;
        if responses.iter().any(|stored| stored.id() == response.id()) {
            return Err(ParticipantRepositoryError::DuplicateScreenerResponse(
                response.id(),
            ));
        }
        responses.push(response.clone());
        Ok(())
    }

    async fn find_by_participant(
        &self,
        participant_id: ParticipantId,
    ) -> ParticipantRepositoryResult<Vec<ScreenerResponse>> {
        let responses = self.responses.read().map_err(lock_error)?;
        Ok(responses
            .iter()
            .filter(|response| response.participant_id() == participant_id)
            .cloned()
            .collect())
    }
}
