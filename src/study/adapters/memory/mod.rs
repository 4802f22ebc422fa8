//! In-memory adapters for study ports.

mod study;

pub use study::InMemoryStudyRepository;
