//! Application services for study protocols and eligibility evaluation.

mod catalog;
mod eligibility;

pub use catalog::{
    AddTaskDefinitionRequest, RegisterStudyRequest, StudyCatalogError, StudyCatalogResult,
    StudyCatalogService,
};
pub use eligibility::{
    EligibilityEvaluationError, EligibilityEvaluationResult, EligibilityEvaluator,
};
