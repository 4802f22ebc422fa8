//! Port contracts for study protocols.
//!
//! Ports define infrastructure-agnostic interfaces used by study services.

pub mod repository;

pub use repository::{StudyRepository, StudyRepositoryError, StudyRepositoryResult};
