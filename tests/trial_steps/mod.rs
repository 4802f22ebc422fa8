//! Step definitions for trial workflow scenarios.


mod given;
mod then;
mod when;
