//! Adapter implementations for safety ports.

pub mod logging;
pub mod memory;
