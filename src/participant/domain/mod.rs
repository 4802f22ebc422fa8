//! Domain model for the participant lifecycle.
//!
//! The status graph in [`ParticipantStatus`] is the single authority on
//! which status changes are legal; [`Participant`] exposes no other way to
//! change its status.

mod error;
mod ids;
mod participant;
mod screener;
mod status;

pub use error::{ParseParticipantStatusError, ParticipantDomainError};
pub use ids::{ParticipantId, ScreenerResponseId, UserId};
pub use participant::{
    Participant, ParticipantProfile, PersistedParticipantData, StatusChange,
};
pub use screener::ScreenerResponse;
pub use status::{ParticipantStatus, TransitionCause, validate_transition};
