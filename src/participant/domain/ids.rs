//! Identifier types for the participant domain.

use crate::ids::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a participant record.
    ParticipantId
);

uuid_identifier!(
    /// Identifier of the user account a participant belongs to.
    ///
    /// Issued by the auth collaborator and trusted as-is.
    UserId
);

uuid_identifier!(
    /// Unique identifier for a recorded screener response.
    ScreenerResponseId
);
