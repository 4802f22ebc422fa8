//! Study aggregate root and recruitment status.

use super::{
    EligibilityRuleSet, ParseStudyStatusError, StudyDomainError, StudyId, TaskDefinition,
    TaskDefinitionId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recruitment status of a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudyStatus {
    /// Protocol is being drafted and is not visible to participants.
    Draft,
    /// Study is accepting screeners.
    Recruiting,
    /// Study is running; screeners are still accepted.
    Active,
    /// Study has been closed.
    Closed,
}

impl StudyStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Recruiting => "RECRUITING",
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
        }
    }

    /// Returns `true` when the study accepts screener submissions.
    #[must_use]
    pub const fn accepts_screeners(self) -> bool {
        matches!(self, Self::Recruiting | Self::Active)
    }
}

impl fmt::Display for StudyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for StudyStatus {
    type Error = ParseStudyStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "DRAFT" => Ok(Self::Draft),
            "RECRUITING" => Ok(Self::Recruiting),
            "ACTIVE" => Ok(Self::Active),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(ParseStudyStatusError(value.to_owned())),
        }
    }
}

/// Descriptive metadata shown to prospective participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDetails {
    title: String,
    description: String,
    condition: Option<String>,
    location: Option<String>,
    compensation: Option<String>,
}

impl StudyDetails {
    /// Creates validated study details.
    ///
    /// # Errors
    ///
    /// Returns [`StudyDomainError::EmptyTitle`] or
    /// [`StudyDomainError::EmptyDescription`] for blank values.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, StudyDomainError> {
        let raw_title = title.into();
        let raw_description = description.into();
        if raw_title.trim().is_empty() {
            return Err(StudyDomainError::EmptyTitle);
        }
        if raw_description.trim().is_empty() {
            return Err(StudyDomainError::EmptyDescription);
        }
        Ok(Self {
            title: raw_title.trim().to_owned(),
            description: raw_description.trim().to_owned(),
            condition: None,
            location: None,
            compensation: None,
        })
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

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the studied condition, if any.
    #[must_use]
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    /// Returns the location, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the compensation summary, if any.
    #[must_use]
    pub fn compensation(&self) -> Option<&str> {
        self.compensation.as_deref()
    }
}

/// Study aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    id: StudyId,
    details: StudyDetails,
    status: StudyStatus,
    eligibility: EligibilityRuleSet,
    task_definitions: Vec<TaskDefinition>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted study aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedStudyData {
    /// Persisted study identifier.
    pub id: StudyId,
    /// Persisted descriptive metadata.
    pub details: StudyDetails,
    /// Persisted recruitment status.
    pub status: StudyStatus,
    /// Persisted eligibility rules.
    pub eligibility: EligibilityRuleSet,
    /// Persisted task definitions in protocol order.
    pub task_definitions: Vec<TaskDefinition>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Study {
    /// Creates a draft study with the baseline eligibility rules and no
    /// tasks.
    #[must_use]
    pub fn new(details: StudyDetails, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: StudyId::new(),
            details,
            status: StudyStatus::Draft,
            eligibility: EligibilityRuleSet::baseline(),
            task_definitions: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a study from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedStudyData) -> Self {
        Self {
            id: data.id,
            details: data.details,
            status: data.status,
            eligibility: data.eligibility,
            task_definitions: data.task_definitions,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the study identifier.
    #[must_use]
    pub const fn id(&self) -> StudyId {
        self.id
    }

    /// Returns the descriptive metadata.
    #[must_use]
    pub const fn details(&self) -> &StudyDetails {
        &self.details
    }

    /// Returns the recruitment status.
    #[must_use]
    pub const fn status(&self) -> StudyStatus {
        self.status
    }

    /// Returns the eligibility rules applied to screeners.
    #[must_use]
    pub const fn eligibility(&self) -> &EligibilityRuleSet {
        &self.eligibility
    }

    /// Returns the task definitions in protocol order.
    #[must_use]
    pub fn task_definitions(&self) -> &[TaskDefinition] {
        &self.task_definitions
    }

    /// Finds one of this study's task definitions.
    #[must_use]
    pub fn task_definition(&self, id: TaskDefinitionId) -> Option<&TaskDefinition> {
        self.task_definitions
            .iter()
            .find(|definition| definition.id() == id)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the descriptive metadata.
    pub fn update_details(&mut self, details: StudyDetails, clock: &impl Clock) {
        self.details = details;
        self.touch(clock);
    }

    /// Sets the recruitment status.
    pub fn set_status(&mut self, status: StudyStatus, clock: &impl Clock) {
        self.status = status;
        self.touch(clock);
    }

    /// Replaces the eligibility rule set.
    pub fn configure_eligibility(&mut self, rules: EligibilityRuleSet, clock: &impl Clock) {
        self.eligibility = rules;
        self.touch(clock);
    }

    /// Appends a task definition at the end of the protocol.
    ///
    /// # Errors
    ///
    /// Returns [`StudyDomainError::ForeignTaskDefinition`] when the
    /// definition was built for another study.
    pub fn add_task_definition(
        &mut self,
        definition: TaskDefinition,
        clock: &impl Clock,
    ) -> Result<(), StudyDomainError> {
        if definition.study_id() != self.id {
            return Err(StudyDomainError::ForeignTaskDefinition {
                definition_id: definition.id(),
                study_id: self.id,
            });
        }
        self.task_definitions.push(definition);
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
