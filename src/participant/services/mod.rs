//! Application services for participant registration, screening, and
//! status transitions.

mod enrollment;

pub use enrollment::{
    EnrollmentError, EnrollmentResult, EnrollmentService, RegisterParticipantRequest,
    ScreenerOutcome, StatusTransition, SubmitScreenerRequest, TransitionParticipantRequest,
};
