//! Port contracts for participant persistence.

pub mod repository;

pub use repository::{
    ParticipantFilter, ParticipantRepository, ParticipantRepositoryError,
    ParticipantRepositoryResult, ScreenerResponseRepository,
};
