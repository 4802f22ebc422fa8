//! In-memory repository for study protocols.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::study::{
    domain::{Study, StudyId, StudyStatus},
    ports::{StudyRepository, StudyRepositoryError, StudyRepositoryResult},
};

/// Thread-safe in-memory study repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStudyRepository {
    studies: Arc<RwLock<HashMap<StudyId, Study>>>,
}

impl InMemoryStudyRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> StudyRepositoryError {
    StudyRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl StudyRepository for InMemoryStudyRepository {
    async fn store(&self, study: &Study) -> StudyRepositoryResult<()> {
        let mut studies = self.studies.write().map_err(lock_error)?;
        if studies.contains_key(&study.id()) {
            return Err(StudyRepositoryError::DuplicateStudy(study.id()));
        }
        studies.insert(study.id(), study.clone());
        Ok(())
    }

    async fn update(&self, study: &Study) -> StudyRepositoryResult<()> {
        let mut studies = self.studies.write().map_err(lock_error)?;
        let slot = studies
            .get_mut(&study.id())
            .ok_or(StudyRepositoryError::NotFound(study.id()))?;
        *slot = study.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: StudyId) -> StudyRepositoryResult<Option<Study>> {
        let studies = self.studies.read().map_err(lock_error)?;
        Ok(studies.get(&id).cloned())
    }

    async fn list_by_status(&self, statuses: &[StudyStatus]) -> StudyRepositoryResult<Vec<Study>> {
        let studies = self.studies.read().map_err(lock_error)?;
        let mut matching: Vec<Study> = studies
            .values()
            .filter(|study| statuses.contains(&study.status()))
            .cloned()
            .collect();
        matching.sort_by_key(|study| std::cmp::Reverse(study.created_at()));
        Ok(matching)
    }
}
