//! In-memory adapters for schedule ports.

mod task_instance;

pub use task_instance::InMemoryTaskInstanceRepository;
