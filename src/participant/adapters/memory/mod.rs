//! In-memory adapters for participant ports.

mod participant;
mod screener;

pub use participant::InMemoryParticipantRepository;
pub use screener::InMemoryScreenerResponseRepository;
