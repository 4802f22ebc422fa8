//! Service layer for study registration and protocol configuration.

use crate::{
    config::CohortConfig,
    error::ErrorKind,
    study::{
        domain::{
            EligibilityRuleSet, ParseStudyStatusError, Study, StudyDetails, StudyDomainError,
            StudyId, StudyStatus, TaskDefinition, TaskType,
        },
        ports::{StudyRepository, StudyRepositoryError},
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for registering a new study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterStudyRequest {
    title: String,
    description: String,
    condition: Option<String>,
    location: Option<String>,
    compensation: Option<String>,
    eligibility: Option<EligibilityRuleSet>,
}

impl RegisterStudyRequest {
    /// Creates a request with the required study fields.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            condition: None,
            location: None,
            compensation: None,
            eligibility: None,
        }
    }

    /// Sets the studied condition.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Sets the study location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the compensation summary.
    #[must_use]
    pub fn with_compensation(mut self, compensation: impl Into<String>) -> Self {
        self.compensation = Some(compensation.into());
        self
    }

    /// Overrides the baseline eligibility rules.
    #[must_use]
    pub fn with_eligibility(mut self, rules: EligibilityRuleSet) -> Self {
        self.eligibility = Some(rules);
        self
    }
}

/// Request payload for appending a task definition to a study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskDefinitionRequest {
    study_id: StudyId,
    title: String,
    description: Option<String>,
    task_type: TaskType,
    due_day_offset: u32,
    window_days: Option<u32>,
}

impl AddTaskDefinitionRequest {
    /// Creates a request for a task available `due_day_offset` days after
    /// enrollment.
    #[must_use]
    pub fn new(study_id: StudyId, title: impl Into<String>, due_day_offset: u32) -> Self {
        Self {
            study_id,
            title: title.into(),
            description: None,
            task_type: TaskType::default(),
            due_day_offset,
            window_days: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    /// Sets an explicit completion window instead of the configured
    /// default.
    #[must_use]
    pub const fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = Some(window_days);
        self
    }
}

/// Service-level errors for study catalog operations.
#[derive(Debug, Error)]
pub enum StudyCatalogError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] StudyDomainError),
    /// A study status label could not be parsed.
    #[error(transparent)]
    InvalidStatus(#[from] ParseStudyStatusError),
    /// No study exists with the given identifier.
    #[error("study {0} not found")]
    NotFound(StudyId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] StudyRepositoryError),
}

impl StudyCatalogError {
    /// Classifies the error for the calling layer.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::InvalidStatus(_) => ErrorKind::Validation,
            Self::NotFound(_) | Self::Repository(StudyRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Repository(_) => ErrorKind::Storage,
        }
    }
}

/// Result type for study catalog operations.
pub type StudyCatalogResult<T> = Result<T, StudyCatalogError>;

/// Study registration and protocol configuration service.
#[derive(Clone)]
pub struct StudyCatalogService<R, C>
where
    R: StudyRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    default_window_days: u32,
}

impl<R, C> StudyCatalogService<R, C>
where
    R: StudyRepository,
    C: Clock + Send + Sync,
{
    /// Creates a catalog service using the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self::with_config(repository, clock, &CohortConfig::default())
    }

    /// Creates a catalog service using `config` for task defaults.
    #[must_use]
    pub const fn with_config(repository: Arc<R>, clock: Arc<C>, config: &CohortConfig) -> Self {
        Self {
            repository,
            clock,
            default_window_days: config.default_window_days,
        }
    }

    /// Registers a new draft study.
    ///
    /// # Errors
    ///
    /// Returns [`StudyCatalogError`] when validation fails or the
    /// repository rejects persistence.
    pub async fn register_study(&self, request: RegisterStudyRequest) -> StudyCatalogResult<Study> {
        let RegisterStudyRequest {
            title,
            description,
            condition,
            location,
            compensation,
            eligibility,
        } = request;

        let mut details = StudyDetails::new(title, description)?;
        if let Some(value) = condition {
            details = details.with_condition(value);
        }
        if let Some(value) = location {
            details = details.with_location(value);
        }
        if let Some(value) = compensation {
            details = details.with_compensation(value);
        }

        let mut study = Study::new(details, &*self.clock);
        if let Some(rules) = eligibility {
            study.configure_eligibility(rules, &*self.clock);
        }
        self.repository.store(&study).await?;
        info!(study_id = %study.id(), title = study.details().title(), "registered study");
        Ok(study)
    }

    /// Appends a task definition to a study's protocol.
    ///
    /// # Errors
    ///
    /// Returns [`StudyCatalogError::NotFound`] for an unknown study,
    /// [`StudyCatalogError::Domain`] for a blank title, or repository
    /// errors.
    pub async fn add_task_definition(
        &self,
        request: AddTaskDefinitionRequest,
    ) -> StudyCatalogResult<TaskDefinition> {
        let mut study = self.find_or_error(request.study_id).await?;
        let window_days = request.window_days.unwrap_or(self.default_window_days);
        let mut definition = TaskDefinition::new(
            study.id(),
            request.title,
            request.due_day_offset,
            window_days,
        )?
        .with_task_type(request.task_type);
        if let Some(description) = request.description {
            definition = definition.with_description(description);
        }

        study.add_task_definition(definition.clone(), &*self.clock)?;
        self.repository.update(&study).await?;
        info!(
            study_id = %study.id(),
            task_definition_id = %definition.id(),
            due_day_offset = definition.due_day_offset(),
            window_days = definition.window_days(),
            "added task definition"
        );
        Ok(definition)
    }

    /// Replaces a study's eligibility rule set.
    ///
    /// # Errors
    ///
    /// Returns [`StudyCatalogError::NotFound`] for an unknown study or
    /// repository errors.
    pub async fn configure_eligibility(
        &self,
        study_id: StudyId,
        rules: EligibilityRuleSet,
    ) -> StudyCatalogResult<Study> {
        let mut study = self.find_or_error(study_id).await?;
        study.configure_eligibility(rules, &*self.clock);
        self.repository.update(&study).await?;
        Ok(study)
    }

    /// Sets a study's recruitment status from its label.
    ///
    /// # Errors
    ///
    /// Returns [`StudyCatalogError::InvalidStatus`] for an unknown label,
    /// [`StudyCatalogError::NotFound`] for an unknown study, or repository
    /// errors.
    pub async fn update_status(
        &self,
        study_id: StudyId,
        status: &str,
    ) -> StudyCatalogResult<Study> {
        let parsed = StudyStatus::try_from(status)?;
        let mut study = self.find_or_error(study_id).await?;
        study.set_status(parsed, &*self.clock);
        self.repository.update(&study).await?;
        info!(%study_id, status = %parsed, "updated study status");
        Ok(study)
    }

    /// Closes a study. Closed studies stop accepting screeners.
    ///
    /// # Errors
    ///
    /// Returns [`StudyCatalogError::NotFound`] for an unknown study or
    /// repository errors.
    pub async fn close(&self, study_id: StudyId) -> StudyCatalogResult<Study> {
        self.update_status(study_id, StudyStatus::Closed.as_str())
            .await
    }

    /// Finds a study by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StudyCatalogError::Repository`] when lookup fails.
    pub async fn find_by_id(&self, study_id: StudyId) -> StudyCatalogResult<Option<Study>> {
        Ok(self.repository.find_by_id(study_id).await?)
    }

    /// Lists studies open to prospective participants, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StudyCatalogError::Repository`] when lookup fails.
    pub async fn list_open(&self) -> StudyCatalogResult<Vec<Study>> {
        Ok(self
            .repository
            .list_by_status(&[StudyStatus::Recruiting, StudyStatus::Active])
            .await?)
    }

    async fn find_or_error(&self, study_id: StudyId) -> StudyCatalogResult<Study> {
        self.repository
            .find_by_id(study_id)
            .await?
            .ok_or(StudyCatalogError::NotFound(study_id))
    }
}
