//! Adapter implementations for participant ports.

pub mod memory;
