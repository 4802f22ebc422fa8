//! Domain model for task instances and their windows.

mod error;
mod ids;
mod instance;
mod plan;

pub use error::{ParseTaskInstanceStatusError, ScheduleDomainError};
pub use ids::TaskInstanceId;
pub use instance::{PersistedTaskInstanceData, TaskInstance, TaskInstanceStatus};
pub use plan::{DuplicatePolicy, TaskWindow, plan_schedule};
