//! Identifier types for the safety domain.

use crate::ids::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a reported adverse event.
    AdverseEventId
);
