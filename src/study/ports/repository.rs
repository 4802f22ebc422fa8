//! Repository port for study persistence and lookup.

use crate::study::domain::{Study, StudyId, StudyStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for study repository operations.
pub type StudyRepositoryResult<T> = Result<T, StudyRepositoryError>;

/// Study persistence contract.
#[async_trait]
pub trait StudyRepository: Send + Sync {
    /// Stores a new study.
    ///
    /// # Errors
    ///
    /// Returns [`StudyRepositoryError::DuplicateStudy`] when the study ID
    /// already exists.
    async fn store(&self, study: &Study) -> StudyRepositoryResult<()>;

    /// Persists changes to an existing study, including its task
    /// definitions and eligibility rules.
    ///
    /// # Errors
    ///
    /// Returns [`StudyRepositoryError::NotFound`] when the study does not
    /// exist.
    async fn update(&self, study: &Study) -> StudyRepositoryResult<()>;

    /// Finds a study by identifier.
    ///
    /// Returns `None` when the study does not exist.
    async fn find_by_id(&self, id: StudyId) -> StudyRepositoryResult<Option<Study>>;

    /// Returns studies whose status is one of `statuses`, newest first.
    async fn list_by_status(&self, statuses: &[StudyStatus]) -> StudyRepositoryResult<Vec<Study>>;
}

/// Errors returned by study repository implementations.
#[derive(Debug, Clone, Error)]
pub enum StudyRepositoryError {
    /// A study with the same identifier already exists.
    #[error("duplicate study identifier: {0}")]
    DuplicateStudy(StudyId),

    /// The study was not found.
    #[error("study not found: {0}")]
    NotFound(StudyId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StudyRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
