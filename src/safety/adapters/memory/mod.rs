//! In-memory adapters for safety ports.

mod adverse_event;

pub use adverse_event::InMemoryAdverseEventRepository;
