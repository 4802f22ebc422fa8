//! Domain model for study protocols and eligibility.
//!
//! Eligibility is evaluated purely from a study's rule set and a typed set
//! of screener answers; no participant state is touched here.

mod eligibility;
mod error;
mod ids;
mod study;
mod task_definition;

pub use eligibility::{
    BASELINE_SCHEMA_VERSION, EligibilityCriterion, EligibilityRuleSet, EligibilityVerdict,
    ScreenerAnswers, ScreenerValue,
};
pub use error::{
    EligibilityError, ParseStudyStatusError, ParseTaskTypeError, StudyDomainError,
};
pub use ids::{StudyId, TaskDefinitionId};
pub use study::{PersistedStudyData, Study, StudyDetails, StudyStatus};
pub use task_definition::{MAX_SCHEDULE_DAYS, TaskDefinition, TaskType};
