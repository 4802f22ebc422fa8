//! Port contracts for task instance persistence.

pub mod repository;

pub use repository::{
    TaskInstanceRepository, TaskInstanceRepositoryError, TaskInstanceRepositoryResult,
};
