//! Eligibility evaluation against a study's configured rule set.

use crate::{
    error::ErrorKind,
    study::{
        domain::{EligibilityError, EligibilityVerdict, ScreenerAnswers, StudyId, StudyStatus},
        ports::{StudyRepository, StudyRepositoryError},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors returned while evaluating a screener for a study.
#[derive(Debug, Error)]
pub enum EligibilityEvaluationError {
    /// The answers could not be evaluated.
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    /// No study exists with the given identifier.
    #[error("study {0} not found")]
    StudyNotFound(StudyId),
    /// The study is not accepting screeners.
    #[error("study {study_id} is {status} and does not accept screeners")]
    StudyNotRecruiting {
        /// Study identifier.
        study_id: StudyId,
        /// Current recruitment status.
        status: StudyStatus,
    },
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] StudyRepositoryError),
}

impl EligibilityEvaluationError {
    /// Classifies the error for the calling layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Eligibility(_) | Self::StudyNotRecruiting { .. } => ErrorKind::Validation,
            Self::StudyNotFound(_) | Self::Repository(StudyRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Repository(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for eligibility evaluation.
pub type EligibilityEvaluationResult<T> = Result<T, EligibilityEvaluationError>;

/// Resolves a study's rule set and applies it to screener answers.
///
/// The evaluator never mutates participant state; callers apply the
/// verdict through the participant status transition rules.
#[derive(Clone)]
pub struct EligibilityEvaluator<R>
where
    R: StudyRepository,
{
    repository: Arc<R>,
}

impl<R> EligibilityEvaluator<R>
where
    R: StudyRepository,
{
    /// Creates an evaluator reading rule sets from `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Evaluates screener answers against the study's rule set.
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityEvaluationError::StudyNotFound`] for an unknown
    /// study, [`EligibilityEvaluationError::StudyNotRecruiting`] when the
    /// study does not accept screeners, and
    /// [`EligibilityEvaluationError::Eligibility`] for malformed answers.
    pub async fn evaluate(
        &self,
        study_id: StudyId,
        answers: &ScreenerAnswers,
    ) -> EligibilityEvaluationResult<EligibilityVerdict> {
        let study = self
            .repository
            .find_by_id(study_id)
            .await?
            .ok_or(EligibilityEvaluationError::StudyNotFound(study_id))?;
        if !study.status().accepts_screeners() {
            return Err(EligibilityEvaluationError::StudyNotRecruiting {
                study_id,
                status: study.status(),
            });
        }

        let verdict = study.eligibility().evaluate(answers)?;
        debug!(
            %study_id,
            eligible = verdict.is_eligible(),
            unmet = verdict.unmet_criteria().len(),
            "evaluated screener answers"
        );
        Ok(verdict)
    }
}
