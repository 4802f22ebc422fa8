//! Adapter implementations for study ports.

pub mod memory;
